use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use crate::graph::decomposition::{decompose, FlowCycle};
use crate::graph::simplify::IndexMap;
use crate::solution::interpret::objective_value;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value and cycles of a circulation reported by a classical flow solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CirculationReport {
    pub value: u64,
    pub cycles: Vec<FlowCycle>,
}

impl fmt::Display for CirculationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution value: {}", self.value)?;
        for cycle in &self.cycles {
            writeln!(f, "{}", cycle)?;
        }
        Ok(())
    }
}

/// Check an arc flow over `graph` and decompose it into cycles.
///
/// Unlike QUBO candidates there is no through-flow to compare against, so
/// a flow breaking conservation is a [`QuboError::NotCirculation`] rather
/// than a report.
pub fn evaluate_circulation(
    flow: &Matrix<u64>,
    graph: &FlowGraph,
    index_map: &IndexMap,
) -> Result<CirculationReport, QuboError> {
    if flow.size() != graph.vertex_count() {
        return Err(QuboError::DimensionMismatch {
            capacity: graph.vertex_count(),
            weight: flow.size(),
        });
    }
    let cycles = decompose(flow, index_map)?;
    let value = objective_value(flow, graph.weight())?;
    info!("Classical solution value {}", value);
    Ok(CirculationReport { value, cycles })
}
