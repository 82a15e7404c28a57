//! QUBO construction: binary encoding, penalty scaling and matrix assembly.

pub mod assembler;
pub mod encoding;
pub mod scaling;
