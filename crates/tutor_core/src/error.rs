//! Error types shared by all problem engines.

use thiserror::Error;

/// Errors raised while constructing a problem or deriving its steps.
///
/// All of these are synchronous, construction-time failures: a problem
/// either fully constructs or fails with one of these, never partially.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Zero denominator or zero divisor.
    #[error("divide by zero: {0}")]
    DivideByZero(String),

    /// A unit index, name, or conversion distance falls outside the
    /// configured unit sequence.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Contradictory or unusable generation parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
