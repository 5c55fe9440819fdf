//! Problem generation and step derivation engines.
//!
//! Each engine takes an explicitly constructed or randomly generated
//! arithmetic problem and deterministically derives the final answer
//! plus an ordered list of intermediate steps forming a pedagogically
//! correct worked solution. All computations are pure functions over
//! immutable inputs; random generation takes a caller-supplied
//! [`rand::Rng`] so generated problems are reproducible from a seed.

pub mod dimensional;
pub mod long_division;
pub mod part_of_whole;
pub mod units;

pub use dimensional::{DimensionalAnalysis, RandomDaConfig};
pub use long_division::{LongDivision, RandomDivisionConfig};
pub use part_of_whole::PartOfWhole;
pub use units::{CarryStep, Quantity, RandomQuantityConfig, Simplification, UnitDef, UnitSystem};

pub use tutor_core::{
    DivisionStep, EngineError, Fraction, Operand, StepPayload, UnitFraction, UnitName,
    WorkbookStep,
};
