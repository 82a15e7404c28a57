//! Tab-separated graph, QUBO and solution files.
//!
//! * Graph: `2n` rows of `n` integers, capacity rows first, then weight rows.
//! * QUBO: one row per variable, coefficients with 6 significant digits.
//! * Solutions: one candidate per row; the leading fields are `0`/`1`,
//!   anything after the expected length (energies, counts) is ignored.

use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use crate::qubo::assembler::QuboMatrix;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const GRAPH_SUFFIX: &str = ".graph.tsv";

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
}

fn writer<W: Write>(output: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(output)
}

fn parse_row(record: &StringRecord, row: usize) -> Result<Vec<u64>, QuboError> {
    record
        .iter()
        .enumerate()
        .map(|(column, field)| {
            field.trim().parse::<u64>().map_err(|_| QuboError::InvalidNumber {
                row,
                column,
                value: field.to_string(),
            })
        })
        .collect()
}

/// Read a graph: `n` capacity rows followed by `n` weight rows.
///
/// `n` is the length of the first row; every other row must match it.
pub fn read_graph<R: Read>(input: R) -> Result<FlowGraph, QuboError> {
    let mut rows = Vec::new();
    for (row, record) in reader(input).records().enumerate() {
        rows.push(parse_row(&record?, row)?);
    }
    let n = match rows.first() {
        Some(first) => first.len(),
        None => return Err(QuboError::EmptyInput),
    };
    if let Some((row, found)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != n)
        .map(|(row, r)| (row, r.len()))
    {
        return Err(QuboError::RaggedRow {
            row,
            expected: n,
            found,
        });
    }
    if rows.len() != 2 * n {
        return Err(QuboError::DimensionMismatch {
            capacity: n,
            weight: rows.len().saturating_sub(n),
        });
    }

    let weight = rows.split_off(n);
    let graph = FlowGraph::from_rows(rows, weight)?;
    info!(
        "Read graph with {} vertices and {} arcs",
        graph.vertex_count(),
        graph.arc_count()
    );
    Ok(graph)
}

pub fn read_graph_file(path: impl AsRef<Path>) -> Result<FlowGraph, QuboError> {
    read_graph(File::open(path)?)
}

fn write_integer_rows<W: Write>(out: &mut csv::Writer<W>, matrix: &Matrix<u64>) -> Result<(), QuboError> {
    for row in matrix.rows() {
        out.write_record(row.iter().map(|v| v.to_string()))?;
    }
    Ok(())
}

/// Write a graph in the layout [`read_graph`] expects.
pub fn write_graph<W: Write>(output: W, graph: &FlowGraph) -> Result<(), QuboError> {
    let mut out = writer(output);
    write_integer_rows(&mut out, graph.capacity())?;
    write_integer_rows(&mut out, graph.weight())?;
    out.flush()?;
    Ok(())
}

pub fn write_graph_file(path: impl AsRef<Path>, graph: &FlowGraph) -> Result<(), QuboError> {
    write_graph(File::create(path)?, graph)
}

/// Write the full QUBO matrix, row-major.
pub fn write_qubo<W: Write>(output: W, qubo: &QuboMatrix) -> Result<(), QuboError> {
    let mut out = writer(output);
    for row in qubo.coefficients().rows() {
        out.write_record(row.iter().map(|&x| format_significant(x)))?;
    }
    out.flush()?;
    debug!("Wrote {}x{} QUBO", qubo.size(), qubo.size());
    Ok(())
}

pub fn write_qubo_file(path: impl AsRef<Path>, qubo: &QuboMatrix) -> Result<(), QuboError> {
    write_qubo(File::create(path)?, qubo)
}

/// Read candidate assignments of `expected` variables each.
pub fn read_solutions<R: Read>(input: R, expected: usize) -> Result<Vec<Vec<bool>>, QuboError> {
    let mut candidates = Vec::new();
    for (candidate, record) in reader(input).records().enumerate() {
        let record = record?;
        if record.len() < expected {
            return Err(QuboError::SolutionLength {
                expected,
                found: record.len(),
            });
        }
        let assignment = record
            .iter()
            .take(expected)
            .enumerate()
            .map(|(index, token)| match token.trim() {
                "1" => Ok(true),
                "0" => Ok(false),
                other => Err(QuboError::InvalidToken {
                    candidate,
                    index,
                    token: other.to_string(),
                }),
            })
            .collect::<Result<Vec<bool>, QuboError>>()?;
        candidates.push(assignment);
    }
    info!("Read {} candidate solutions", candidates.len());
    Ok(candidates)
}

pub fn read_solutions_file(path: impl AsRef<Path>, expected: usize) -> Result<Vec<Vec<bool>>, QuboError> {
    read_solutions(File::open(path)?, expected)
}

/// Replace the `.graph.tsv` suffix of `input` with `suffix`, or append
/// `suffix` if the input has a different name.
///
/// # Examples
///
/// ```
/// use cycle_qubo::io::tsv::derived_path;
/// use std::path::PathBuf;
///
/// assert_eq!(derived_path("runs/a.graph.tsv", ".qubo.tsv"), PathBuf::from("runs/a.qubo.tsv"));
/// assert_eq!(derived_path("a.txt", ".qubo.tsv"), PathBuf::from("a.txt.qubo.tsv"));
/// ```
pub fn derived_path(input: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let name = input.as_ref().to_string_lossy();
    match name.strip_suffix(GRAPH_SUFFIX) {
        Some(stem) => PathBuf::from(format!("{}{}", stem, suffix)),
        None => PathBuf::from(format!("{}{}", name, suffix)),
    }
}

/// Format with 6 significant digits, dropping trailing zeros, switching to
/// exponent notation outside `1e-4 <= |x| < 1e6`.
pub fn format_significant(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return x.to_string();
    }
    let scientific = format!("{:.5e}", x);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
