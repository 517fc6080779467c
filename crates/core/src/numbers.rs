//! Decimal Numbers
//!
//! Exact decimal parsing for values that arrive as JSON numbers, numeric strings or plain text.
//! Numbers never pass through binary floating point: JSON numbers keep their source text.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

/// Parse decimal text, accepting plain (`"12.50"`) and scientific (`"1.25e1"`) notation.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();

    Decimal::from_str(trimmed)
        .or_else(|_err| Decimal::from_scientific(trimmed))
        .ok()
}

/// Read a decimal from a JSON number or numeric string.
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Deserialize a decimal from a number or numeric string.
///
/// # Errors
///
/// Fails when the value is neither.
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    decimal_from_json(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a decimal number, found {value}")))
}

/// Serde adapter writing a decimal as a JSON number.
pub mod as_number {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserializer, Serialize, Serializer, ser};
    use serde_json::Number;

    /// Serialize `value` as a number with its exact decimal digits.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Number::from_str(&value.to_string())
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }

    /// Deserialize from a number or numeric string.
    ///
    /// # Errors
    ///
    /// Fails when the value is neither.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize_decimal(deserializer)
    }
}

/// Serde adapter writing a decimal as a string.
pub mod as_string {
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    /// Serialize `value` as a string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Deserialize from a number or numeric string.
    ///
    /// # Errors
    ///
    /// Fails when the value is neither.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::deserialize_decimal(deserializer)
    }
}

/// Whether `value` holds something [`decimal_from_json`] accepts.
#[must_use]
pub fn is_decimal(value: &Value) -> bool {
    decimal_from_json(value).is_some()
}
