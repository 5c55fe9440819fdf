//! Exact-rational value type with simplification.

use std::fmt;

use num_integer::Integer;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// An immutable fraction stored in lowest terms.
///
/// The pair supplied at construction is retained separately so callers
/// can display the unsimplified form next to the reduced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
    original_numerator: i64,
    original_denominator: i64,
}

impl Fraction {
    /// Builds a fraction and reduces it to lowest terms.
    ///
    /// Fails with [`EngineError::DivideByZero`] when `denominator` is 0.
    /// The sign is normalized onto the numerator.
    pub fn new(numerator: i64, denominator: i64) -> Result<Self, EngineError> {
        if denominator == 0 {
            return Err(EngineError::DivideByZero(format!(
                "fraction {numerator}/0 has a zero denominator"
            )));
        }
        let g = numerator.gcd(&denominator);
        let (mut n, mut d) = (numerator / g, denominator / g);
        if d < 0 {
            n = -n;
            d = -d;
        }
        Ok(Self {
            numerator: n,
            denominator: d,
            original_numerator: numerator,
            original_denominator: denominator,
        })
    }

    /// Numerator of the reduced fraction.
    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    /// Denominator of the reduced fraction. Always positive.
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// The `(numerator, denominator)` pair as originally supplied.
    pub fn original(&self) -> (i64, i64) {
        (self.original_numerator, self.original_denominator)
    }

    /// Plain-text `n/d`, either the reduced pair or the original one.
    pub fn to_display_string(&self, use_original: bool) -> String {
        if use_original {
            format!("{}/{}", self.original_numerator, self.original_denominator)
        } else {
            format!("{}/{}", self.numerator, self.denominator)
        }
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
