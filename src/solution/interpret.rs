use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use crate::graph::decomposition::{decompose, FlowCycle};
use crate::graph::simplify::IndexMap;
use crate::qubo::encoding::TranslationTable;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer flows recovered from a binary assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowAssignment {
    /// Declared through-flow per (reduced) vertex.
    pub through: Vec<u64>,
    /// Flow per arc.
    pub arcs: Matrix<u64>,
}

impl FlowAssignment {
    /// Every vertex's declared through-flow equals both its outflow and its inflow.
    pub fn is_feasible(&self) -> bool {
        (0..self.through.len()).all(|v| {
            let through = self.through[v];
            self.arcs.row_sum(v) == through && self.arcs.column_sum(v) == through
        })
    }

    /// Vertices where declared through-flow, inflow and outflow disagree.
    pub fn breaks(&self, index_map: &IndexMap) -> Vec<VertexBreak> {
        (0..self.through.len())
            .filter_map(|v| {
                let through = self.through[v];
                let inflow = self.arcs.column_sum(v);
                let outflow = self.arcs.row_sum(v);
                if inflow == through && outflow == through {
                    return None;
                }
                Some(VertexBreak {
                    vertex: index_map.original(v),
                    reduced_vertex: v,
                    inflow,
                    through,
                    outflow,
                })
            })
            .collect()
    }
}

/// A conservation violation at one vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexBreak {
    /// Index in the input graph.
    pub vertex: usize,
    /// Index in the simplified graph.
    pub reduced_vertex: usize,
    pub inflow: u64,
    pub through: u64,
    pub outflow: u64,
}

impl fmt::Display for VertexBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Break at vertex {}; {} in simplified graph",
            self.vertex, self.reduced_vertex
        )?;
        writeln!(f, "  In:      {}", self.inflow)?;
        writeln!(f, "  Through: {}", self.through)?;
        write!(f, "  Out:     {}", self.outflow)
    }
}

/// Sum the digit weights of every set variable into vertex and arc flows.
pub fn backtranslate(
    assignment: &[bool],
    table: &TranslationTable,
) -> Result<FlowAssignment, QuboError> {
    if assignment.len() != table.len() {
        return Err(QuboError::SolutionLength {
            expected: table.len(),
            found: assignment.len(),
        });
    }

    let n = table.vertex_count();
    let mut through = vec![0u64; n];
    let mut arcs = Matrix::zeros(n);
    for (variable, _) in table
        .variables()
        .iter()
        .zip(assignment)
        .filter(|&(_, &set)| set)
    {
        if variable.is_vertex() {
            through[variable.origin] += variable.weight;
        } else {
            arcs[(variable.origin, variable.destination)] += variable.weight;
        }
    }
    Ok(FlowAssignment { through, arcs })
}

/// Total reward `Σ flow[i][j] · weight[i][j]` over arcs carrying flow.
///
/// Fails with [`QuboError::ObjectiveOverflow`] when the total does not fit
/// in a `u64`.
pub fn objective_value(flow: &Matrix<u64>, weight: &Matrix<u64>) -> Result<u64, QuboError> {
    flow.positive_entries().try_fold(0u64, |total, (i, j, f)| {
        f.checked_mul(weight[(i, j)])
            .and_then(|reward| total.checked_add(reward))
            .ok_or(QuboError::ObjectiveOverflow)
    })
}

/// Outcome of checking a batch of solver candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Interpretation {
    /// The first feasible candidate, its value and its cycle decomposition.
    Feasible {
        candidate: usize,
        value: u64,
        cycles: Vec<FlowCycle>,
    },
    /// No candidate was feasible; breaks of the first one.
    Infeasible { breaks: Vec<VertexBreak> },
}

impl Interpretation {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Interpretation::Feasible { .. })
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpretation::Feasible {
                candidate,
                value,
                cycles,
            } => {
                writeln!(f, "Solution {} is feasible", candidate)?;
                writeln!(f, "Solution value: {}", value)?;
                for cycle in cycles {
                    writeln!(f, "{}", cycle)?;
                }
            }
            Interpretation::Infeasible { breaks } => {
                writeln!(f, "None of the solutions are feasible")?;
                writeln!(f, "Breaks in the first solution:")?;
                for b in breaks {
                    writeln!(f, "{}", b)?;
                }
            }
        }
        Ok(())
    }
}

/// Try candidates in order and report the first feasible one.
///
/// Infeasible candidates are expected from heuristic solvers and are not an
/// error; if none is feasible the breaks of the first candidate are
/// reported instead. Malformed candidates (wrong length) abort.
pub fn interpret(
    candidates: &[Vec<bool>],
    table: &TranslationTable,
    graph: &FlowGraph,
    index_map: &IndexMap,
) -> Result<Interpretation, QuboError> {
    let Some(first) = candidates.first() else {
        return Err(QuboError::NoCandidates);
    };

    for (candidate, assignment) in candidates.iter().enumerate() {
        let flows = backtranslate(assignment, table)?;
        if flows.is_feasible() {
            info!("The {}-th solution is feasible", candidate);
            let value = objective_value(&flows.arcs, graph.weight())?;
            let cycles = decompose(&flows.arcs, index_map)?;
            return Ok(Interpretation::Feasible {
                candidate,
                value,
                cycles,
            });
        }
    }

    warn!("None of the {} solutions are feasible", candidates.len());
    let breaks = backtranslate(first, table)?.breaks(index_map);
    for b in &breaks {
        warn!(
            "Break at vertex {} (in {}, through {}, out {})",
            b.vertex, b.inflow, b.through, b.outflow
        );
    }
    Ok(Interpretation::Infeasible { breaks })
}
