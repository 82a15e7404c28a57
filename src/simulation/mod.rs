//! Synthetic workloads.

pub mod instance;
