//! Graph algorithms: capacity tightening, ring labelling and cycle decomposition.

pub mod decomposition;
pub mod rings;
pub mod simplify;
