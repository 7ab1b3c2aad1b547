//! Error types for compiling, solving and decoding puzzles

use thiserror::Error;

/// Errors raised by the encode/solve/decode core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SokobanError {
    /// The grid cannot describe a puzzle instance
    #[error("malformed instance: {0}")]
    MalformedInstance(String),

    /// A variable lookup fell outside the compiled layout
    #[error("variable out of range: {0}")]
    VariableOutOfRange(String),

    /// The variable space does not fit in a signed 32-bit literal
    #[error("encoding too large: {variables} variables exceed the literal range")]
    EncodingTooLarge { variables: u64 },

    /// The solver neither proved nor refuted the formula
    #[error("solver boundary failure: {0}")]
    SolverBoundaryFailure(String),

    /// A satisfying model contradicts the compiled constraints
    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}

pub type SokobanResult<T> = Result<T, SokobanError>;
