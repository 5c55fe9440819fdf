//! Shared value types for the arithmetic tutoring engines.
//!
//! Everything here is an immutable value computed once at problem
//! construction time: exact fractions, the workbook step model consumed
//! by the rendering layer, and the error taxonomy shared by all engines.

pub mod error;
pub mod fraction;
pub mod step;

pub use error::EngineError;
pub use fraction::Fraction;
pub use step::{
    DivisionStep, Operand, StepPayload, UnitFraction, UnitName, WorkbookStep,
};
