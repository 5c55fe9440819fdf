//! Fraction-of-a-whole word problems.
//!
//! Acceptance-answer only: the engine computes the final value and the
//! answer step, with no intermediate step trace.

use serde::{Deserialize, Serialize};

use tutor_core::{Fraction, Operand, StepPayload, UnitName, WorkbookStep};

/// A "what is `part` of `whole`?" word problem. The wording may contain
/// the `{{PART}}` and `{{WHOLE}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOfWhole {
    wording: String,
    /// Answer unit, e.g. "roasted chickens".
    unit: String,
    whole: u64,
    part: Fraction,
}

impl PartOfWhole {
    pub fn new(wording: &str, unit: &str, whole: u64, part: Fraction) -> Self {
        Self {
            wording: wording.to_string(),
            unit: unit.to_string(),
            whole,
            part,
        }
    }

    pub fn whole(&self) -> u64 {
        self.whole
    }

    pub fn part(&self) -> Fraction {
        self.part
    }

    /// `whole * numerator / denominator`, real-valued.
    pub fn compute_answer(&self) -> f64 {
        self.whole as f64 * self.part.numerator() as f64 / self.part.denominator() as f64
    }

    /// The wording with its placeholders substituted.
    pub fn problem_text(&self) -> String {
        self.wording
            .replace("{{PART}}", &self.part.to_display_string(false))
            .replace("{{WHOLE}}", &self.whole.to_string())
    }

    /// The final-answer acceptance step. The answer value is truncated
    /// to a whole count of the answer unit.
    pub fn answer_step(&self) -> WorkbookStep {
        WorkbookStep::new(StepPayload::Answer {
            operands: vec![Operand::with_unit(
                self.compute_answer() as i64,
                UnitName::new(&self.unit, &self.unit),
            )],
        })
        .with_incorrect("Sorry, that is not correct.")
    }
}
