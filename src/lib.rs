//! # cycle-qubo
//!
//! QUBO encoder and decoder for maximum-weight circulations.
//!
//! Given a directed graph with integer arc capacities and per-unit rewards,
//! this crate builds a Quadratic Unconstrained Binary Optimization problem
//! whose minimum corresponds to a maximum-reward circulation, and maps the
//! binary answers of an external solver back to flows and cycles.
//!
//! ## Architecture
//!
//! - **core**: Shared types: matrices, the flow graph, errors, configuration
//! - **graph**: Simplification, ring labelling and cycle decomposition
//! - **qubo**: Binary encoding, penalty scaling and QUBO assembly
//! - **solution**: Backtranslation, feasibility and diagnostics
//! - **io**: Tab-separated graph, QUBO and solution files, DIMACS flow files
//! - **simulation**: Random instance generation
//! - **pipeline**: The whole build/interpret flow in one call

pub mod core;
pub mod graph;
pub mod io;
pub mod pipeline;
pub mod qubo;
pub mod simulation;
pub mod solution;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::config::{Encoding, QuboConfig};
    pub use crate::core::error::QuboError;
    pub use crate::core::graph::FlowGraph;
    pub use crate::core::matrix::Matrix;
    pub use crate::graph::decomposition::FlowCycle;
    pub use crate::pipeline::{BuiltInstance, Pipeline};
    pub use crate::qubo::assembler::QuboMatrix;
    pub use crate::qubo::encoding::TranslationTable;
    pub use crate::solution::{CirculationReport, Interpretation, VertexBreak};
}
