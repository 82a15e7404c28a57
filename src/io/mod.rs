//! File formats consumed and produced around the core pipeline.

pub mod dimacs;
pub mod tsv;
