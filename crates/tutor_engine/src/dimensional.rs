//! Dimensional analysis over a unit scale.
//!
//! A conversion always proceeds from a larger unit down toward the
//! smaller units: the value is multiplied by each crossed
//! `ratio_to_next` in turn (2 yards -> inches is 2 * 3 * 12 = 72). The
//! learner performs the same conversion by chain-multiplying
//! equivalence fractions, each equal to 1.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tutor_core::{EngineError, Operand, StepPayload, UnitFraction, WorkbookStep};

use crate::units::UnitSystem;

/// A conversion request between two units of the same scale.
///
/// `start_index` addresses the larger (starting) unit in the scale's
/// table; the target sits `unit_distance` positions below it. A
/// distance reaching past the smallest unit is a contract violation and
/// fails with [`EngineError::OutOfRange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionalAnalysis {
    pub from_unit: String,
    pub from_value: u64,
    pub to_unit: String,
    pub unit_distance: usize,
    pub start_index: usize,
}

/// Parameters for random conversion-problem generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomDaConfig {
    /// How many unit positions the conversion spans.
    pub unit_distance: usize,
    /// Difficulty level; the starting magnitude is drawn from
    /// `[level + 1, 2 * level]`.
    pub difficulty_level: u64,
    /// Offset of the starting unit, counted down from the largest unit.
    pub unit_offset: usize,
}

impl Default for RandomDaConfig {
    fn default() -> Self {
        Self {
            unit_distance: 2,
            difficulty_level: 2,
            unit_offset: 0,
        }
    }
}

impl UnitSystem {
    /// Picks a starting unit `unit_offset` positions from the top of
    /// the scale and a target `unit_distance` positions further down,
    /// with a random magnitude.
    pub fn random_dimensional_analysis(
        &self,
        config: &RandomDaConfig,
        rng: &mut impl Rng,
    ) -> Result<DimensionalAnalysis, EngineError> {
        if config.unit_distance == 0 {
            return Err(EngineError::InvalidConfiguration(
                "a conversion must span at least one unit position".to_string(),
            ));
        }
        let units = self.units();
        let start_index = units
            .len()
            .checked_sub(1 + config.unit_offset)
            .ok_or_else(|| {
                EngineError::OutOfRange(format!(
                    "unit offset {} exceeds the {} scale",
                    config.unit_offset,
                    self.name()
                ))
            })?;
        let target_index = start_index
            .checked_sub(config.unit_distance)
            .ok_or_else(|| {
                EngineError::OutOfRange(format!(
                    "no unit {} positions below '{}' on the {} scale",
                    config.unit_distance,
                    units[start_index].plural,
                    self.name()
                ))
            })?;

        let level = config.difficulty_level as f64;
        let from_value = (rng.random::<f64>() * level + level).floor() as u64 + 1;

        let spec = DimensionalAnalysis {
            from_unit: units[start_index].plural.clone(),
            from_value,
            to_unit: units[target_index].plural.clone(),
            unit_distance: config.unit_distance,
            start_index,
        };
        debug!(system = %self.name(), ?spec, "generated random conversion");
        Ok(spec)
    }

    /// Converts `from_value` down to the target unit by multiplying
    /// through each crossed ratio: result = from_value * prod(ratios).
    pub fn solve_dimensional_analysis(
        &self,
        spec: &DimensionalAnalysis,
    ) -> Result<u64, EngineError> {
        let (start, target) = self.conversion_bounds(spec)?;
        let mut value = spec.from_value;
        for unit in &self.units()[target..start] {
            // Every unit below the start carries a ratio.
            value *= unit.ratio_to_next.unwrap_or(1);
        }
        Ok(value)
    }

    /// Derives the equivalence-fraction workbook steps: exactly
    /// `unit_distance` fraction picks, each followed by a "need
    /// another?" checkpoint (answered "No" only on the last), then a
    /// final cancel-matching-units step.
    pub fn dimensional_analysis_steps(
        &self,
        spec: &DimensionalAnalysis,
    ) -> Result<Vec<WorkbookStep>, EngineError> {
        let (start, target) = self.conversion_bounds(spec)?;
        let units = self.units();
        let choices = self.equivalence_fractions();

        // The fraction chosen at position i converts units[i + 1] into
        // units[i]: ratio(units[i]) units[i] over 1 units[i + 1].
        let fraction_at = |i: usize| {
            UnitFraction::new(
                units[i].ratio_to_next.unwrap_or(1),
                &units[i].plural,
                1,
                &units[i + 1].singular,
            )
        };

        let mut steps = Vec::with_capacity(spec.unit_distance * 2 + 1);
        for k in 0..spec.unit_distance {
            let current = start - k;
            let mut completed = vec![UnitFraction::over_one(spec.from_value, &spec.from_unit)];
            completed.extend((current..start).rev().map(fraction_at));

            steps.push(
                WorkbookStep::new(StepPayload::EquivalenceFraction {
                    completed,
                    choices: choices.clone(),
                    expected: fraction_at(current - 1),
                })
                .with_instructions("Choose your next equivalence fraction.")
                .with_help(
                    "Choose an equivalency from the dropdown and enter the numerator \
                     and denominator below.",
                ),
            );

            let last_fraction = current - 1 == target;
            let (not, do_not) = if last_fraction {
                ("not ", "")
            } else {
                ("", "do not ")
            };
            steps.push(
                WorkbookStep::new(StepPayload::YesNo {
                    answer: !last_fraction,
                })
                .with_instructions("Do you need another equivalence fraction?")
                .with_incorrect(format!(
                    "Incorrect: you do {not}need another equivalence fraction, because \
                     your latest numerator units {do_not}match your answer units."
                )),
            );
        }

        // Cancellation: every denominator strikes out against the
        // previous fraction's numerator; the last numerator survives as
        // the answer unit.
        let mut chain = vec![UnitFraction::over_one(spec.from_value, &spec.from_unit)];
        chain.extend((target..start).rev().map(fraction_at));
        let last = chain.len() - 1;
        for (i, fraction) in chain.iter_mut().enumerate() {
            fraction.numerator_cancels = i != last;
            fraction.denominator_cancels = i != 0;
        }
        steps.push(
            WorkbookStep::new(StepPayload::CancelUnits { chain })
                .with_instructions("Click on \"like\" units to cancel"),
        );

        Ok(steps)
    }

    /// The final-answer acceptance step for a conversion problem.
    pub fn dimensional_analysis_answer(
        &self,
        spec: &DimensionalAnalysis,
    ) -> Result<WorkbookStep, EngineError> {
        let (_, target) = self.conversion_bounds(spec)?;
        let converted = self.solve_dimensional_analysis(spec)?;
        let target_unit = &self.units()[target];
        Ok(WorkbookStep::new(StepPayload::Answer {
            operands: vec![Operand::with_unit(
                converted as i64,
                tutor_core::UnitName::new(&target_unit.singular, &target_unit.plural),
            )],
        })
        .with_incorrect("Sorry, that is not correct."))
    }

    /// The problem wording, e.g. "Convert 2 yards to inches".
    pub fn dimensional_analysis_problem_text(
        &self,
        spec: &DimensionalAnalysis,
    ) -> Result<String, EngineError> {
        let (start, _) = self.conversion_bounds(spec)?;
        let from = &self.units()[start];
        let label = if spec.from_value == 1 {
            &from.singular
        } else {
            &from.plural
        };
        Ok(format!(
            "Convert {} {label} to {}",
            spec.from_value, spec.to_unit
        ))
    }

    /// Validates a conversion spec against this scale and returns the
    /// (start, target) unit indices.
    fn conversion_bounds(
        &self,
        spec: &DimensionalAnalysis,
    ) -> Result<(usize, usize), EngineError> {
        let units = self.units();
        if spec.start_index >= units.len() {
            return Err(EngineError::OutOfRange(format!(
                "start index {} exceeds the {} scale",
                spec.start_index,
                self.name()
            )));
        }
        if units[spec.start_index].plural != spec.from_unit {
            return Err(EngineError::OutOfRange(format!(
                "unit '{}' is not at position {} of the {} scale",
                spec.from_unit,
                spec.start_index,
                self.name()
            )));
        }
        let target = spec
            .start_index
            .checked_sub(spec.unit_distance)
            .ok_or_else(|| {
                EngineError::OutOfRange(format!(
                    "no unit {} positions below '{}' on the {} scale",
                    spec.unit_distance,
                    spec.from_unit,
                    self.name()
                ))
            })?;
        if units[target].plural != spec.to_unit {
            return Err(EngineError::OutOfRange(format!(
                "target unit '{}' is not {} positions below '{}'",
                spec.to_unit, spec.unit_distance, spec.from_unit
            )));
        }
        Ok((spec.start_index, target))
    }
}
