//! Translating solver output back into flows and checking it.

pub mod classical;
pub mod interpret;

pub use classical::{evaluate_circulation, CirculationReport};
pub use interpret::{
    backtranslate, interpret, objective_value, FlowAssignment, Interpretation, VertexBreak,
};
