//! Markups
//!
//! Channel-wide percentage surcharges.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

use crate::numbers::{deserialize_decimal, parse_decimal};

/// Channel metadata key holding the markup percentage.
pub const MARKUP_METADATA_KEY: &str = "price_markup_percent";

/// Highest accepted markup percentage.
pub const MAX_MARKUP_PERCENT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Errors raised while constructing a [`MarkupPercent`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// The value is negative or above [`MAX_MARKUP_PERCENT`].
    #[error("markup percent {0} outside 0-1000")]
    OutOfRange(Decimal),

    /// The text is not a number.
    #[error("markup percent {0:?} is not a number")]
    NotANumber(String),
}

/// Markup percentage in `0..=1000`, e.g. `15` for a 15% surcharge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkupPercent(Decimal);

impl MarkupPercent {
    /// No markup.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a markup, checking its range.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::OutOfRange`] for negative values or values above 1000.
    pub fn new(percent: Decimal) -> Result<Self, MarkupError> {
        if percent < Decimal::ZERO || percent > MAX_MARKUP_PERCENT {
            return Err(MarkupError::OutOfRange(percent));
        }

        Ok(Self(percent))
    }

    /// The percentage value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// The markup rounded to two decimal places, as it is stored.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Multiplier applied to a price: `1 + percent / 100`.
    #[must_use]
    pub fn factor(self) -> Decimal {
        Decimal::ONE + self.0 / Decimal::ONE_HUNDRED
    }
}

impl TryFrom<Decimal> for MarkupPercent {
    type Error = MarkupError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MarkupPercent> for Decimal {
    fn from(value: MarkupPercent) -> Self {
        value.0
    }
}

impl FromStr for MarkupPercent {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let percent = parse_decimal(s).ok_or_else(|| MarkupError::NotANumber(s.to_string()))?;

        Self::new(percent)
    }
}

impl fmt::Display for MarkupPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for MarkupPercent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MarkupPercent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Self::new(deserialize_decimal(deserializer)?).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn accepts_zero_to_one_thousand() -> TestResult {
        assert_eq!(MarkupPercent::new(Decimal::ZERO)?, MarkupPercent::ZERO);
        assert_eq!(
            MarkupPercent::new(Decimal::new(1000, 0))?.value(),
            MAX_MARKUP_PERCENT
        );

        Ok(())
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            MarkupPercent::new(Decimal::new(-1, 2)),
            Err(MarkupError::OutOfRange(Decimal::new(-1, 2)))
        );
        assert_eq!(
            MarkupPercent::new(Decimal::new(100_001, 2)),
            Err(MarkupError::OutOfRange(Decimal::new(100_001, 2)))
        );
    }

    #[test]
    fn negative_zero_is_zero() -> TestResult {
        let markup: MarkupPercent = "-0".parse()?;

        assert!(markup.value().is_zero());

        Ok(())
    }

    #[test]
    fn parses_text() -> TestResult {
        let markup: MarkupPercent = "15.5".parse()?;

        assert_eq!(markup.value(), Decimal::new(155, 1));
        assert_eq!(
            "fifteen".parse::<MarkupPercent>(),
            Err(MarkupError::NotANumber("fifteen".to_string()))
        );

        Ok(())
    }

    #[test]
    fn rounds_to_two_places_half_even() -> TestResult {
        assert_eq!(
            MarkupPercent::new(Decimal::new(15_125, 3))?.rounded().value(),
            Decimal::new(1512, 2)
        );
        assert_eq!(
            MarkupPercent::new(Decimal::new(15_135, 3))?.rounded().value(),
            Decimal::new(1514, 2)
        );

        Ok(())
    }

    #[test]
    fn factor_is_exact() -> TestResult {
        let markup = MarkupPercent::new(Decimal::new(15, 0))?;

        assert_eq!(markup.factor(), Decimal::new(115, 2));

        Ok(())
    }

    #[test]
    fn serde_uses_strings_and_accepts_numbers() -> TestResult {
        let markup: MarkupPercent = serde_json::from_str("12.5")?;

        assert_eq!(serde_json::to_string(&markup)?, r#""12.5""#);
        assert!(serde_json::from_str::<MarkupPercent>("1001").is_err());

        Ok(())
    }
}
