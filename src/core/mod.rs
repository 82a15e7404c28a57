//! Shared data types: matrices, the flow graph, configuration and errors.

pub mod config;
pub mod error;
pub mod graph;
pub mod matrix;
