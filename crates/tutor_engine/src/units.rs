//! Generic mixed-radix compound-unit model.
//!
//! A unit system is an ordered table of unit descriptors, smallest unit
//! first, each carrying the ratio to the next-larger unit (the largest
//! has none). A quantity like 40 inches is "unsimplified" when a unit's
//! count reaches or exceeds its ratio; simplification carries overflow
//! upward one unit at a time, recording the pre-carry sum at every
//! level so the work can be shown to the learner.

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tutor_core::{
    EngineError, Operand, StepPayload, UnitFraction, UnitName, WorkbookStep,
};

/// A quantity: unit plural name mapped to a non-negative count.
pub type Quantity = FxHashMap<String, u64>;

/// One entry of a unit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDef {
    pub singular: String,
    pub plural: String,
    /// How many of this unit make one of the next-larger unit.
    /// `None` for the largest unit of the table.
    pub ratio_to_next: Option<u64>,
}

impl UnitDef {
    pub fn new(singular: &str, plural: &str, ratio_to_next: u64) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            ratio_to_next: Some(ratio_to_next),
        }
    }

    /// The largest unit of a table, with no ratio upward.
    pub fn largest(singular: &str, plural: &str) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            ratio_to_next: None,
        }
    }

    fn name(&self) -> UnitName {
        UnitName::new(&self.singular, &self.plural)
    }
}

/// The recorded intermediate state of one unit during simplification:
/// the sum before reduction, what stays at this unit, and what carries
/// into the next-larger unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryStep {
    pub unit: String,
    pub pre_carry_sum: u64,
    pub kept: u64,
    pub carry_out: u64,
}

/// Result of [`UnitSystem::simplify`]: the input, the fully reduced
/// counts for every unit, and the per-unit carry trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simplification {
    pub unsimplified: Quantity,
    pub simplified: Quantity,
    pub carry_steps: Vec<CarryStep>,
}

/// Parameters for random unsimplified-quantity generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomQuantityConfig {
    /// How many consecutive unit types the quantity covers.
    pub unit_count: usize,
    /// Difficulty level; larger values widen the random count range.
    pub difficulty_level: u64,
    /// Index of the smallest unit to include.
    pub unit_offset: usize,
}

impl Default for RandomQuantityConfig {
    fn default() -> Self {
        Self {
            unit_count: 2,
            difficulty_level: 2,
            unit_offset: 0,
        }
    }
}

/// A fixed, ordered unit scale (length, volume, weight, or custom).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSystem {
    name: String,
    units: Vec<UnitDef>,
}

impl UnitSystem {
    /// Builds a custom unit system, smallest unit first.
    pub fn new(name: &str, units: Vec<UnitDef>) -> Result<Self, EngineError> {
        if units.is_empty() {
            return Err(EngineError::InvalidConfiguration(format!(
                "unit system '{name}' has no units"
            )));
        }
        let last = units.len() - 1;
        for (i, unit) in units.iter().enumerate() {
            match unit.ratio_to_next {
                Some(_) if i == last => {
                    return Err(EngineError::InvalidConfiguration(format!(
                        "largest unit '{}' must not have a ratio to a next unit",
                        unit.plural
                    )));
                }
                Some(ratio) if ratio < 2 => {
                    return Err(EngineError::InvalidConfiguration(format!(
                        "unit '{}' has ratio {ratio}; ratios must be at least 2",
                        unit.plural
                    )));
                }
                None if i != last => {
                    return Err(EngineError::InvalidConfiguration(format!(
                        "unit '{}' is missing its ratio to the next unit",
                        unit.plural
                    )));
                }
                _ => {}
            }
            if units[..i].iter().any(|u| u.plural == unit.plural) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate unit name '{}'",
                    unit.plural
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            units,
        })
    }

    /// English length: inches, feet, yards.
    pub fn length() -> Self {
        Self {
            name: "length".to_string(),
            units: vec![
                UnitDef::new("inch", "inches", 12),
                UnitDef::new("foot", "feet", 3),
                UnitDef::largest("yard", "yards"),
            ],
        }
    }

    /// US kitchen volume: teaspoons up to gallons.
    pub fn volume() -> Self {
        Self {
            name: "volume".to_string(),
            units: vec![
                UnitDef::new("teaspoon", "tsp", 3),
                UnitDef::new("tablespoon", "tbs", 2),
                UnitDef::new("ounce", "oz", 8),
                UnitDef::new("cup", "c", 2),
                UnitDef::new("pint", "pt", 2),
                UnitDef::new("quart", "qt", 4),
                UnitDef::largest("gallon", "gal"),
            ],
        }
    }

    /// Avoirdupois weight: ounces, pounds, tons.
    pub fn weight() -> Self {
        Self {
            name: "weight".to_string(),
            units: vec![
                UnitDef::new("ounce", "ounces", 16),
                UnitDef::new("pound", "pounds", 2000),
                UnitDef::largest("ton", "tons"),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered unit table, smallest unit first.
    pub fn units(&self) -> &[UnitDef] {
        &self.units
    }

    /// Index of a unit by its plural name.
    pub fn index_of(&self, plural: &str) -> Result<usize, EngineError> {
        self.units
            .iter()
            .position(|u| u.plural == plural)
            .ok_or_else(|| {
                EngineError::OutOfRange(format!(
                    "unit '{plural}' is not part of the {} scale",
                    self.name
                ))
            })
    }

    /// Normalizes a quantity so every unit's count is strictly less
    /// than its ratio to the next unit (largest unit unbounded).
    ///
    /// Units must be processed smallest to largest: each unit's carry
    /// feeds the next-larger unit's sum. The carry trace records the
    /// pre-carry sum at every level.
    pub fn simplify(&self, unsimplified: &Quantity) -> Result<Simplification, EngineError> {
        for unit in unsimplified.keys() {
            self.index_of(unit)?;
        }

        let mut simplified = Quantity::default();
        let mut carry_steps = Vec::with_capacity(self.units.len());
        let mut carry = 0u64;
        for unit in &self.units {
            let sum = unsimplified.get(&unit.plural).copied().unwrap_or(0) + carry;
            let (kept, carry_out) = match unit.ratio_to_next {
                Some(ratio) => (sum % ratio, sum / ratio),
                None => (sum, 0),
            };
            carry_steps.push(CarryStep {
                unit: unit.plural.clone(),
                pre_carry_sum: sum,
                kept,
                carry_out,
            });
            simplified.insert(unit.plural.clone(), kept);
            carry = carry_out;
        }

        debug!(system = %self.name, ?simplified, "simplified quantity");
        Ok(Simplification {
            unsimplified: unsimplified.clone(),
            simplified,
            carry_steps,
        })
    }

    /// Total magnitude of a quantity expressed in the smallest unit.
    pub fn magnitude_in_smallest(&self, quantity: &Quantity) -> Result<u64, EngineError> {
        for unit in quantity.keys() {
            self.index_of(unit)?;
        }
        let mut total = 0u64;
        let mut place = 1u64;
        for unit in &self.units {
            total += quantity.get(&unit.plural).copied().unwrap_or(0) * place;
            place *= unit.ratio_to_next.unwrap_or(1);
        }
        Ok(total)
    }

    /// Derives the workbook steps that walk a learner through a
    /// simplification: for each unit, from the smallest present in the
    /// input upward while magnitude remains above the current unit, a
    /// division step (pre-carry sum by ratio) then an addition step
    /// (carry plus the next unit's original count).
    pub fn simplification_steps(
        &self,
        simplification: &Simplification,
    ) -> Result<Vec<WorkbookStep>, EngineError> {
        let Some(start) = self
            .units
            .iter()
            .position(|u| simplification.unsimplified.contains_key(&u.plural))
        else {
            return Ok(Vec::new());
        };

        let mut remaining: u64 = self
            .units
            .iter()
            .map(|u| self.simplified_count(simplification, &u.plural))
            .sum::<Result<u64, _>>()?;

        let mut steps = Vec::new();
        for (i, unit) in self.units.iter().enumerate().skip(start) {
            remaining -= self.simplified_count(simplification, &unit.plural)?;
            if remaining == 0 {
                break;
            }
            // remaining > 0 means a larger unit still holds value, so a
            // next unit and a ratio both exist here.
            let Some(ratio) = unit.ratio_to_next else {
                break;
            };
            let next = &self.units[i + 1];
            let carry_step = &simplification.carry_steps[i];
            let sum = carry_step.pre_carry_sum;
            let pulled_out = carry_step.carry_out;

            steps.push(
                WorkbookStep::new(StepPayload::Division {
                    dividend: sum,
                    dividend_unit: Some(unit.name()),
                    divisor: ratio,
                    divisor_unit: Some(next.name()),
                    quotient: pulled_out,
                    remainder: carry_step.kept,
                })
                .with_instructions(format!(
                    "Express the {} more simply in {} and {}",
                    unit.plural, next.plural, unit.plural
                ))
                .with_help(format!(
                    "Since {ratio} {} equals 1 {} we must divide {sum} by {ratio}.",
                    unit.plural, next.singular
                )),
            );

            let original = simplification
                .unsimplified
                .get(&next.plural)
                .copied()
                .unwrap_or(0);
            steps.push(
                WorkbookStep::new(StepPayload::Addition {
                    augend: original,
                    addend: pulled_out,
                    sum: original + pulled_out,
                    unit: Some(next.name()),
                })
                .with_instructions(format!(
                    "Now add the original number of {} to the {} \"pulled out\" from simplifying the {}",
                    next.plural, next.plural, unit.plural
                ))
                .with_help(format!(
                    "You must now combine the {} simplified out of the smaller unit with the {} in the original problem.",
                    next.plural, next.plural
                )),
            );
        }
        Ok(steps)
    }

    /// The final-answer acceptance step for a simplification problem.
    /// Operands run largest to smallest; units absent from the input
    /// that never saw a carry are skipped.
    pub fn simplification_answer(
        &self,
        simplification: &Simplification,
    ) -> Result<WorkbookStep, EngineError> {
        let mut operands = Vec::new();
        for (i, unit) in self.units.iter().enumerate().rev() {
            let value = self.simplified_count(simplification, &unit.plural)?;
            let in_input = simplification
                .unsimplified
                .get(&unit.plural)
                .copied()
                .unwrap_or(0)
                != 0;
            if !in_input && simplification.carry_steps[i].pre_carry_sum == 0 {
                continue;
            }
            operands.push(Operand::with_unit(value as i64, unit.name()));
        }
        Ok(WorkbookStep::new(StepPayload::Answer { operands })
            .with_help(
                "First, we decide if the measurement needs to be simplified or not. \
                 Always start with the smallest measurement label.",
            )
            .with_incorrect("Sorry, that is not correct."))
    }

    /// Plain-text rendering of a simplified quantity, largest unit
    /// first: "1 yard, 0 feet, 4 inches". Zero counts above the largest
    /// nonzero unit are omitted; an all-zero quantity renders as zero
    /// of the smallest unit.
    pub fn simplified_display(
        &self,
        simplification: &Simplification,
    ) -> Result<String, EngineError> {
        let mut parts = Vec::new();
        let mut seen_nonzero = false;
        for unit in self.units.iter().rev() {
            let value = self.simplified_count(simplification, &unit.plural)?;
            if value == 0 && !seen_nonzero {
                continue;
            }
            seen_nonzero = true;
            parts.push(format!("{value} {}", unit.name().label_for(value)));
        }
        if parts.is_empty() {
            let smallest = &self.units[0];
            parts.push(format!("0 {}", smallest.plural));
        }
        Ok(parts.join(", "))
    }

    /// One equivalence fraction per adjacent unit pair, smallest pair
    /// first: "12 inches / 1 foot", "3 feet / 1 yard", ...
    pub fn equivalence_fractions(&self) -> Vec<UnitFraction> {
        self.units
            .windows(2)
            .map(|pair| {
                // Non-last units always carry a ratio.
                let ratio = pair[0].ratio_to_next.unwrap_or(1);
                UnitFraction::new(ratio, &pair[0].plural, 1, &pair[1].singular)
            })
            .collect()
    }

    /// Generates a random unsimplified quantity covering `unit_count`
    /// consecutive units starting at `unit_offset`. Counts are drawn
    /// over-full (at least ratio + difficulty) so simplification is
    /// always required.
    pub fn random_unsimplified(
        &self,
        config: &RandomQuantityConfig,
        rng: &mut impl Rng,
    ) -> Result<Quantity, EngineError> {
        if config.unit_count == 0 {
            return Err(EngineError::InvalidConfiguration(
                "a random quantity needs at least one unit type".to_string(),
            ));
        }
        let end = config.unit_offset + config.unit_count;
        if end > self.units.len() {
            return Err(EngineError::OutOfRange(format!(
                "units {}..{} requested but the {} scale has only {}",
                config.unit_offset,
                end,
                self.name,
                self.units.len()
            )));
        }

        let level = config.difficulty_level;
        let mut quantity = Quantity::default();
        for unit in &self.units[config.unit_offset..end] {
            let ratio = unit.ratio_to_next.unwrap_or(1);
            let spread = (level * ratio) as f64;
            let count = (rng.random::<f64>() * spread).round() as u64 + ratio + level;
            quantity.insert(unit.plural.clone(), count);
        }
        debug!(system = %self.name, ?quantity, "generated random unsimplified quantity");
        Ok(quantity)
    }

    fn simplified_count(
        &self,
        simplification: &Simplification,
        plural: &str,
    ) -> Result<u64, EngineError> {
        simplification
            .simplified
            .get(plural)
            .copied()
            .ok_or_else(|| {
                EngineError::OutOfRange(format!(
                    "simplification result is missing unit '{plural}'"
                ))
            })
    }
}
