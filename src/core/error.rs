use thiserror::Error;

/// Errors raised while building or interpreting a QUBO instance.
///
/// An infeasible candidate solution is deliberately absent: heuristic
/// solvers are expected to return some, and the interpreter reports them
/// as [`Interpretation::Infeasible`](crate::solution::Interpretation).
#[derive(Debug, Error)]
pub enum QuboError {
    #[error("capacity matrix is {capacity}x{capacity} but weight matrix is {weight}x{weight}")]
    DimensionMismatch { capacity: usize, weight: usize },

    #[error("matrix row {row} has {found} entries, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix of size {size} holds {found} entries")]
    MatrixLength { size: usize, found: usize },

    #[error("invalid number {value:?} at row {row}, column {column}")]
    InvalidNumber {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("input contains no rows")]
    EmptyInput,

    #[error("solution vector has {found} entries, expected {expected}")]
    SolutionLength { expected: usize, found: usize },

    #[error("unexpected value {token:?} in solution {candidate} at index {index} (not 1 or 0)")]
    InvalidToken {
        candidate: usize,
        index: usize,
        token: String,
    },

    /// The encoder produced fewer variables than the bound arithmetic
    /// requires. This is a bug, never a property of the input.
    #[error("translation table holds {actual} variables, expected {expected}")]
    TranslationUnderflow { expected: usize, actual: usize },

    #[error("flow is not a circulation; vertex {vertex} has inflow {inflow} and outflow {outflow}")]
    NotCirculation {
        vertex: usize,
        inflow: u64,
        outflow: u64,
    },

    #[error("objective value of the flow exceeds the 64-bit range")]
    ObjectiveOverflow,

    #[error("ring ratio must be finite and positive, got {0}")]
    InvalidRingRatio(f64),

    #[error("penalty multiplier must be finite and non-negative, got {0}")]
    InvalidMultiplier(f64),

    #[error("malformed DIMACS line {line}: {content:?}")]
    MalformedDimacs { line: usize, content: String },

    #[error("no candidate solutions supplied")]
    NoCandidates,

    #[error("requested instance size {0} is too small, need at least 4")]
    InvalidInstanceSize(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
