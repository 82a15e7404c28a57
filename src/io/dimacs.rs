//! DIMACS min-cost-flow files for solving the same circulation problem
//! with a classical network-flow solver.
//!
//! A maximum-weight circulation `x` on capacities `c` is written as the
//! min-cost flow problem over the residual `f = c - x`: every arc keeps its
//! capacity and has cost `weight`, and vertex `i` supplies
//! `Σ_j c[i][j] - Σ_j c[j][i]`. Conservation of `x` is then exactly the
//! supply constraint on `f`, and minimising `Σ weight·f` maximises
//! `Σ weight·x`. Reading a solution back subtracts the reported flows from
//! the capacities.

use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Write `graph` as a DIMACS `min` problem. Vertices are numbered from 1.
pub fn write_dimacs<W: Write>(output: W, graph: &FlowGraph) -> Result<(), QuboError> {
    let mut output = BufWriter::new(output);
    let n = graph.vertex_count();
    writeln!(output, "p min {} {}", n, graph.arc_count())?;

    for i in 0..n {
        let supply = graph.out_capacity(i) as i128 - graph.in_capacity(i) as i128;
        if supply != 0 {
            writeln!(output, "n {} {}", i + 1, supply)?;
        }
    }

    let weight = graph.weight();
    for (i, j, capacity) in graph.capacity().positive_entries() {
        writeln!(output, "a {} {} 0 {} {}", i + 1, j + 1, capacity, weight[(i, j)])?;
    }
    output.flush()?;
    Ok(())
}

pub fn write_dimacs_file(path: impl AsRef<Path>, graph: &FlowGraph) -> Result<(), QuboError> {
    write_dimacs(File::create(path.as_ref())?, graph)?;
    info!("Wrote DIMACS problem to {}", path.as_ref().display());
    Ok(())
}

/// Read the `f <i> <j> <flow>` lines of a DIMACS solution and return the
/// circulation `capacity - flow`.
///
/// Every other line (`c` comments, the `s` objective line, blank lines) is
/// skipped. A flow line naming a vertex outside the graph, or reporting
/// more flow than the arc can carry, is malformed.
pub fn read_dimacs_flow<R: Read>(input: R, capacity: &Matrix<u64>) -> Result<Matrix<u64>, QuboError> {
    let n = capacity.size();
    let mut circulation = capacity.clone();
    let mut flow_lines = 0usize;

    for (index, line) in BufReader::new(input).lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        if fields.next() != Some("f") {
            continue;
        }
        let malformed = || QuboError::MalformedDimacs {
            line: index + 1,
            content: line.clone(),
        };

        let numbers: Vec<u64> = fields
            .map(|field| field.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| malformed())?;
        let &[i, j, flow] = numbers.as_slice() else {
            return Err(malformed());
        };
        let vertices = n as u64;
        if i == 0 || j == 0 || i > vertices || j > vertices {
            return Err(malformed());
        }
        let arc = (i as usize - 1, j as usize - 1);
        circulation[arc] = circulation[arc].checked_sub(flow).ok_or_else(malformed)?;
        flow_lines += 1;
    }

    debug!("Read {} flow lines", flow_lines);
    Ok(circulation)
}

pub fn read_dimacs_flow_file(
    path: impl AsRef<Path>,
    capacity: &Matrix<u64>,
) -> Result<Matrix<u64>, QuboError> {
    read_dimacs_flow(File::open(path)?, capacity)
}
