//! Long division: quotient, remainder, and the digit-by-digit trace.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tutor_core::{
    DivisionStep, EngineError, Operand, StepPayload, UnitName, WorkbookStep,
};

/// Parameters for random problem generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomDivisionConfig {
    pub divisor_digits: usize,
    pub quotient_digits: usize,
    pub has_remainder: bool,
    /// Lower bound for leading digits, clamped to 9. Higher values make
    /// the numbers larger.
    pub difficulty: u64,
}

impl Default for RandomDivisionConfig {
    fn default() -> Self {
        Self {
            divisor_digits: 1,
            quotient_digits: 2,
            has_remainder: false,
            difficulty: 2,
        }
    }
}

/// A long division problem with its answer and full step trace, all
/// computed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongDivision {
    dividend: u64,
    divisor: u64,
    quotient: u64,
    remainder: u64,
    steps: Vec<DivisionStep>,
}

impl LongDivision {
    /// Solves `dividend / divisor` and derives the step trace.
    /// Fails with [`EngineError::DivideByZero`] when `divisor` is 0.
    pub fn new(dividend: u64, divisor: u64) -> Result<Self, EngineError> {
        if divisor == 0 {
            return Err(EngineError::DivideByZero(format!(
                "cannot divide {dividend} by zero"
            )));
        }
        let quotient = dividend / divisor;
        let remainder = dividend % divisor;
        let steps = compute_steps(dividend, divisor, quotient);
        debug!(dividend, divisor, quotient, remainder, "constructed long division");
        Ok(Self {
            dividend,
            divisor,
            quotient,
            remainder,
            steps,
        })
    }

    /// Builds a random problem: the divisor and quotient are drawn
    /// digit by digit (leading digits at least `difficulty`), the
    /// dividend is their product, plus a remainder in
    /// `[1, divisor - 1]` when requested. A 3-digit divisor forces a
    /// 2-digit quotient (keeps the dividend within 5 digits) and a
    /// leading divisor digit of 1 or 2.
    pub fn random(
        config: &RandomDivisionConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, EngineError> {
        if config.divisor_digits == 0 || config.quotient_digits == 0 {
            return Err(EngineError::InvalidConfiguration(
                "divisor and quotient need at least one digit each".to_string(),
            ));
        }
        let difficulty = config.difficulty.clamp(1, 9);

        let quotient_digits = if config.divisor_digits == 3 {
            2
        } else {
            config.quotient_digits
        };

        let divisor_lead = if config.divisor_digits == 3 {
            rng.random_range(1..=2)
        } else {
            rng.random_range(difficulty..=9)
        };
        let divisor = random_number(divisor_lead, config.divisor_digits, rng);

        let quotient_lead = rng.random_range(difficulty..=9);
        let quotient = random_number(quotient_lead, quotient_digits, rng);

        let mut dividend = divisor * quotient;
        if config.has_remainder {
            if divisor == 1 {
                return Err(EngineError::InvalidConfiguration(
                    "a divisor of 1 cannot produce a remainder".to_string(),
                ));
            }
            dividend += rng.random_range(1..divisor);
        }
        Self::new(dividend, divisor)
    }

    pub fn dividend(&self) -> u64 {
        self.dividend
    }

    pub fn divisor(&self) -> u64 {
        self.divisor
    }

    pub fn quotient(&self) -> u64 {
        self.quotient
    }

    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    /// The ordered digit-by-digit trace, one step per quotient digit.
    pub fn steps(&self) -> &[DivisionStep] {
        &self.steps
    }

    /// The leading portion of the dividend the first step divides.
    pub fn first_partial_dividend(&self) -> u64 {
        self.steps[0].partial_dividend
    }

    /// Count of leading dividend digits consumed before the quotient's
    /// first digit lines up; used by renderers to align the quotient.
    pub fn dividend_quotient_digit_gap(&self) -> usize {
        digits_of(self.dividend).len() - self.steps.len()
    }

    /// The workbook steps: place the numbers, select the first partial
    /// dividend, then work the digit-by-digit trace.
    pub fn workbook_steps(&self) -> Vec<WorkbookStep> {
        let gap = self.dividend_quotient_digit_gap();
        vec![
            WorkbookStep::new(StepPayload::DivisionSetup {
                divisor: self.divisor,
                dividend: self.dividend,
            })
            .with_instructions(
                "Drag and drop each number in its appropriate place on the division box.",
            ),
            WorkbookStep::new(StepPayload::SelectFirstPartial {
                dividend_digits: digits_of(self.dividend),
                selected_digit_count: gap + 1,
            })
            .with_instructions(
                "Select the first portion of the dividend that is larger than the divisor.",
            ),
            WorkbookStep::new(StepPayload::DivisionTrace {
                steps: self.steps.clone(),
            })
            .with_instructions(format!(
                "Divide {} into {}",
                self.divisor,
                self.first_partial_dividend()
            ))
            .with_leading_spaces(gap),
        ]
    }

    /// The final-answer acceptance step: quotient and remainder.
    pub fn answer_step(&self) -> WorkbookStep {
        WorkbookStep::new(StepPayload::Answer {
            operands: vec![
                Operand::with_unit(
                    self.quotient as i64,
                    UnitName::new("quotient", "quotient"),
                ),
                Operand::with_unit(
                    self.remainder as i64,
                    UnitName::new("remainder", "remainder"),
                ),
            ],
        })
        .with_incorrect("Sorry, that is not correct.")
    }

    /// The problem wording, e.g. "Find the quotient of 846 and 3".
    pub fn problem_text(&self) -> String {
        format!("Find the quotient of {} and {}", self.dividend, self.divisor)
    }
}

/// Derives the standard long-division trace. One step per quotient
/// digit; step 1 divides the first `gap + 1` dividend digits where
/// `gap = digits(dividend) - digits(quotient)`, and every later step
/// divides `previous remainder * 10 + next dividend digit`. Steps with
/// a zero quotient digit are emitted, not skipped.
fn compute_steps(dividend: u64, divisor: u64, quotient: u64) -> Vec<DivisionStep> {
    let dividend_digits = digits_of(dividend);
    let step_count = digits_of(quotient).len();
    let gap = dividend_digits.len() - step_count;

    let mut steps: Vec<DivisionStep> = Vec::with_capacity(step_count);
    for i in 0..step_count {
        let partial_dividend = match steps.last() {
            None => number_from(&dividend_digits[..=gap]),
            Some(previous) => {
                previous.remainder * 10 + u64::from(dividend_digits[gap + i])
            }
        };
        let quotient_digit = (partial_dividend / divisor) as u8;
        let product = u64::from(quotient_digit) * divisor;
        steps.push(DivisionStep {
            partial_dividend,
            quotient_digit,
            product,
            remainder: partial_dividend - product,
            brought_down: dividend_digits.get(gap + i + 1).copied(),
        });
    }
    steps
}

/// Decimal digits, most significant first. Zero is a single digit.
fn digits_of(mut n: u64) -> Vec<u8> {
    let mut digits = Vec::new();
    loop {
        digits.push((n % 10) as u8);
        n /= 10;
        if n == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

fn number_from(digits: &[u8]) -> u64 {
    digits.iter().fold(0, |acc, &d| acc * 10 + u64::from(d))
}

/// Builds an n-digit number from a fixed leading digit and uniformly
/// random remaining digits.
fn random_number(leading: u64, digit_count: usize, rng: &mut impl Rng) -> u64 {
    let mut number = leading;
    for _ in 1..digit_count {
        number = number * 10 + rng.random_range(0..=9);
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn divides_846_by_3() {
        let problem = LongDivision::new(846, 3).unwrap();
        assert_eq!(problem.quotient(), 282);
        assert_eq!(problem.remainder(), 0);

        // 846 and 282 both have 3 digits, so the first step divides the
        // single leading digit.
        assert_eq!(
            problem.steps(),
            &[
                DivisionStep {
                    partial_dividend: 8,
                    quotient_digit: 2,
                    product: 6,
                    remainder: 2,
                    brought_down: Some(4),
                },
                DivisionStep {
                    partial_dividend: 24,
                    quotient_digit: 8,
                    product: 24,
                    remainder: 0,
                    brought_down: Some(6),
                },
                DivisionStep {
                    partial_dividend: 6,
                    quotient_digit: 2,
                    product: 6,
                    remainder: 0,
                    brought_down: None,
                },
            ]
        );
    }

    #[test]
    fn small_dividend_yields_a_single_zero_digit_step() {
        let problem = LongDivision::new(5, 26).unwrap();
        assert_eq!(problem.quotient(), 0);
        assert_eq!(problem.remainder(), 5);
        assert_eq!(
            problem.steps(),
            &[DivisionStep {
                partial_dividend: 5,
                quotient_digit: 0,
                product: 0,
                remainder: 5,
                brought_down: None,
            }]
        );
    }

    #[test]
    fn multi_digit_chunk_smaller_than_divisor() {
        // 105 / 26: 10 < 26, so the first partial dividend spans all
        // three digits and the trace is a single step.
        let problem = LongDivision::new(105, 26).unwrap();
        assert_eq!(problem.quotient(), 4);
        assert_eq!(problem.remainder(), 1);
        assert_eq!(problem.steps().len(), 1);
        assert_eq!(problem.steps()[0].partial_dividend, 105);
        assert_eq!(problem.dividend_quotient_digit_gap(), 2);
    }

    #[test]
    fn interior_zero_quotient_digits_are_emitted() {
        // 624 / 6 = 104: the middle step divides 2 by 6.
        let problem = LongDivision::new(624, 6).unwrap();
        assert_eq!(problem.quotient(), 104);
        let digits: Vec<u8> = problem.steps().iter().map(|s| s.quotient_digit).collect();
        assert_eq!(digits, vec![1, 0, 4]);
        assert_eq!(problem.steps()[1].partial_dividend, 2);
        assert_eq!(problem.steps()[1].product, 0);
        assert_eq!(problem.steps()[1].remainder, 2);
    }

    #[test]
    fn zero_dividend() {
        let problem = LongDivision::new(0, 7).unwrap();
        assert_eq!(problem.quotient(), 0);
        assert_eq!(problem.remainder(), 0);
        assert_eq!(problem.steps().len(), 1);
    }

    #[test]
    fn zero_divisor_is_an_error() {
        assert!(matches!(
            LongDivision::new(10, 0),
            Err(EngineError::DivideByZero(_))
        ));
    }

    #[test]
    fn trace_reconstructs_the_answer_exhaustively() {
        for dividend in 0..3000u64 {
            for divisor in 1..40u64 {
                let problem = LongDivision::new(dividend, divisor).unwrap();

                assert_eq!(
                    problem.quotient() * divisor + problem.remainder(),
                    dividend
                );
                assert!(problem.remainder() < divisor);

                // The step digits spell out the quotient and every
                // intermediate remainder stays below the divisor.
                let mut rebuilt = 0u64;
                for step in problem.steps() {
                    assert_eq!(
                        u64::from(step.quotient_digit) * divisor,
                        step.product
                    );
                    assert_eq!(step.partial_dividend - step.product, step.remainder);
                    assert!(step.remainder < divisor);
                    rebuilt = rebuilt * 10 + u64::from(step.quotient_digit);
                }
                assert_eq!(rebuilt, problem.quotient());
                assert_eq!(
                    problem.steps().last().unwrap().remainder,
                    problem.remainder()
                );

                // Chaining invariant between consecutive steps.
                for pair in problem.steps().windows(2) {
                    let next_digit = pair[0].brought_down.expect("missing brought-down digit");
                    assert_eq!(
                        pair[1].partial_dividend,
                        pair[0].remainder * 10 + u64::from(next_digit)
                    );
                }
                assert_eq!(problem.steps().last().unwrap().brought_down, None);
            }
        }
    }

    #[test]
    fn random_respects_digit_counts() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = RandomDivisionConfig {
            divisor_digits: 2,
            quotient_digits: 3,
            has_remainder: false,
            difficulty: 2,
        };
        for _ in 0..100 {
            let problem = LongDivision::random(&config, &mut rng).unwrap();
            assert_eq!(digits_of(problem.divisor()).len(), 2);
            assert_eq!(digits_of(problem.quotient()).len(), 3);
            assert_eq!(problem.remainder(), 0);
            assert!(problem.divisor() / 10 >= 2, "leading digit below difficulty");
        }
    }

    #[test]
    fn random_remainder_is_within_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = RandomDivisionConfig {
            divisor_digits: 1,
            quotient_digits: 2,
            has_remainder: true,
            difficulty: 2,
        };
        for _ in 0..100 {
            let problem = LongDivision::random(&config, &mut rng).unwrap();
            assert!(problem.remainder() >= 1);
            assert!(problem.remainder() < problem.divisor());
        }
    }

    #[test]
    fn three_digit_divisor_forces_two_digit_quotient() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = RandomDivisionConfig {
            divisor_digits: 3,
            quotient_digits: 4,
            has_remainder: false,
            difficulty: 2,
        };
        for _ in 0..100 {
            let problem = LongDivision::random(&config, &mut rng).unwrap();
            assert_eq!(digits_of(problem.divisor()).len(), 3);
            assert_eq!(digits_of(problem.quotient()).len(), 2);
            let leading = problem.divisor() / 100;
            assert!(leading == 1 || leading == 2);
            assert!(digits_of(problem.dividend()).len() <= 5);
        }
    }

    #[test]
    fn random_is_reproducible_from_a_seed() {
        let config = RandomDivisionConfig::default();
        let a = LongDivision::random(&config, &mut StdRng::seed_from_u64(21)).unwrap();
        let b = LongDivision::random(&config, &mut StdRng::seed_from_u64(21)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_random_configs_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = RandomDivisionConfig {
            divisor_digits: 0,
            ..RandomDivisionConfig::default()
        };
        assert!(matches!(
            LongDivision::random(&config, &mut rng),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn workbook_steps_and_answer() {
        let problem = LongDivision::new(846, 3).unwrap();
        let steps = problem.workbook_steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(
            steps[0].payload,
            StepPayload::DivisionSetup {
                divisor: 3,
                dividend: 846,
            }
        );
        assert_eq!(
            steps[1].payload,
            StepPayload::SelectFirstPartial {
                dividend_digits: vec![8, 4, 6],
                selected_digit_count: 1,
            }
        );
        assert_eq!(steps[2].instructions, "Divide 3 into 8");
        assert_eq!(steps[2].leading_spaces, 0);

        let answer = problem.answer_step();
        let StepPayload::Answer { operands } = &answer.payload else {
            panic!("expected an answer payload");
        };
        assert_eq!(operands[0].value, 282);
        assert_eq!(operands[1].value, 0);

        assert_eq!(problem.problem_text(), "Find the quotient of 846 and 3");
    }
}
