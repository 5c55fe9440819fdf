//! The workbook step model.
//!
//! Every engine reduces its worked solution to an ordered list of
//! [`WorkbookStep`]s. Each step carries plain data (never markup) with
//! enough detail for a renderer to pose it as a checkable question.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Singular/plural names of a unit, so renderers can pick number
/// agreement ("1 foot" vs "3 feet").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitName {
    pub singular: String,
    pub plural: String,
}

impl UnitName {
    pub fn new(singular: &str, plural: &str) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
        }
    }

    /// The grammatically correct label for `value` of this unit.
    pub fn label_for(&self, value: u64) -> &str {
        if value == 1 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// A single displayable value, optionally tagged with a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    pub value: i64,
    pub unit: Option<UnitName>,
}

impl Operand {
    pub fn bare(value: i64) -> Self {
        Self { value, unit: None }
    }

    pub fn with_unit(value: i64, unit: UnitName) -> Self {
        Self {
            value,
            unit: Some(unit),
        }
    }
}

/// An equivalence fraction: a unit ratio equal to 1, such as
/// "12 inches / 1 foot", chained by multiplication during dimensional
/// analysis. The cancel flags mark which side strikes out against a
/// neighboring fraction in the final cancellation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFraction {
    pub numerator_value: u64,
    pub numerator_unit: Option<String>,
    pub denominator_value: u64,
    pub denominator_unit: Option<String>,
    pub numerator_cancels: bool,
    pub denominator_cancels: bool,
}

impl UnitFraction {
    pub fn new(
        numerator_value: u64,
        numerator_unit: &str,
        denominator_value: u64,
        denominator_unit: &str,
    ) -> Self {
        Self {
            numerator_value,
            numerator_unit: Some(numerator_unit.to_string()),
            denominator_value,
            denominator_unit: Some(denominator_unit.to_string()),
            numerator_cancels: false,
            denominator_cancels: false,
        }
    }

    /// The leading "value over 1" fraction that starts a conversion
    /// chain, e.g. "2 yards / 1".
    pub fn over_one(value: u64, unit: &str) -> Self {
        Self {
            numerator_value: value,
            numerator_unit: Some(unit.to_string()),
            denominator_value: 1,
            denominator_unit: None,
            numerator_cancels: false,
            denominator_cancels: false,
        }
    }
}

impl fmt::Display for UnitFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.numerator_value)?;
        if let Some(unit) = &self.numerator_unit {
            write!(f, " {unit}")?;
        }
        write!(f, " / {}", self.denominator_value)?;
        if let Some(unit) = &self.denominator_unit {
            write!(f, " {unit}")?;
        }
        Ok(())
    }
}

/// One digit-place of a long division trace.
///
/// Invariants: `quotient_digit = partial_dividend / divisor` (floor),
/// `product = quotient_digit * divisor`,
/// `remainder = partial_dividend - product` with `remainder < divisor`,
/// and the next step's partial dividend is
/// `remainder * 10 + brought_down`. `brought_down` is `None` on the
/// last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionStep {
    pub partial_dividend: u64,
    pub quotient_digit: u8,
    pub product: u64,
    pub remainder: u64,
    pub brought_down: Option<u8>,
}

/// The interaction-specific data of a workbook step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPayload {
    /// Divide `dividend` by `divisor`; the learner enters the quotient
    /// (and sees the remainder carried forward).
    Division {
        dividend: u64,
        dividend_unit: Option<UnitName>,
        divisor: u64,
        divisor_unit: Option<UnitName>,
        quotient: u64,
        remainder: u64,
    },
    /// Add two counts of the same unit.
    Addition {
        augend: u64,
        addend: u64,
        sum: u64,
        unit: Option<UnitName>,
    },
    /// Pick the next equivalence fraction of a conversion chain.
    /// `completed` is the chain built so far, `choices` the selectable
    /// equivalencies, `expected` the correct pick.
    EquivalenceFraction {
        completed: Vec<UnitFraction>,
        choices: Vec<UnitFraction>,
        expected: UnitFraction,
    },
    /// A yes/no checkpoint; `answer` is the correct reply.
    YesNo { answer: bool },
    /// Strike out matching units across the finished conversion chain.
    CancelUnits { chain: Vec<UnitFraction> },
    /// A final-answer acceptance step.
    Answer { operands: Vec<Operand> },
    /// Place divisor and dividend on the division box.
    DivisionSetup { divisor: u64, dividend: u64 },
    /// Select the leading portion of the dividend that the first
    /// division step works on.
    SelectFirstPartial {
        dividend_digits: Vec<u8>,
        selected_digit_count: usize,
    },
    /// The full digit-by-digit long division trace.
    DivisionTrace { steps: Vec<DivisionStep> },
}

/// One step of a worked solution, ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookStep {
    pub instructions: String,
    pub help: Option<String>,
    pub incorrect: Option<String>,
    pub leading_spaces: usize,
    pub payload: StepPayload,
}

impl WorkbookStep {
    pub fn new(payload: StepPayload) -> Self {
        Self {
            instructions: String::new(),
            help: None,
            incorrect: None,
            leading_spaces: 0,
            payload,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_incorrect(mut self, incorrect: impl Into<String>) -> Self {
        self.incorrect = Some(incorrect.into());
        self
    }

    pub fn with_leading_spaces(mut self, leading_spaces: usize) -> Self {
        self.leading_spaces = leading_spaces;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains() {
        let step = WorkbookStep::new(StepPayload::YesNo { answer: false })
            .with_instructions("Do you need another equivalence fraction?")
            .with_incorrect("Incorrect.");
        assert_eq!(
            step.instructions,
            "Do you need another equivalence fraction?"
        );
        assert_eq!(step.incorrect.as_deref(), Some("Incorrect."));
        assert_eq!(step.help, None);
        assert_eq!(step.leading_spaces, 0);
    }

    #[test]
    fn unit_fraction_displays_like_a_ratio() {
        let f = UnitFraction::new(12, "inches", 1, "foot");
        assert_eq!(f.to_string(), "12 inches / 1 foot");
        assert_eq!(UnitFraction::over_one(2, "yards").to_string(), "2 yards / 1");
    }

    #[test]
    fn unit_name_agreement() {
        let foot = UnitName::new("foot", "feet");
        assert_eq!(foot.label_for(1), "foot");
        assert_eq!(foot.label_for(3), "feet");
        assert_eq!(foot.label_for(0), "feet");
    }

    #[test]
    fn payload_serializes_with_kind_tag() {
        let step = WorkbookStep::new(StepPayload::Addition {
            augend: 0,
            addend: 3,
            sum: 3,
            unit: Some(UnitName::new("foot", "feet")),
        });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["payload"]["kind"], "addition");
        assert_eq!(json["payload"]["sum"], 3);
    }
}
