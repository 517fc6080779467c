//! Discounts
//!
//! Scheduled, capped percentage adjustments attached to products. A product carries an ordered
//! list of [`DiscountRule`]s stored as JSON under its `discounts` metadata key; the first rule
//! active at a given instant applies.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{periods::Period, schedules::EVERY_MINUTE};

pub mod evaluation;
pub mod validation;

pub use evaluation::select_active_discount;
pub use validation::{DiscountRuleInput, ValidationErrors, validate_rule, validate_rules};

/// Product metadata key holding the JSON encoded rule list.
pub const DISCOUNTS_METADATA_KEY: &str = "discounts";

/// A percentage adjustment with a clamping bound, a cron schedule and an optional period.
///
/// Serialized field names match the stored metadata, including the historical `shedule`
/// spelling. `schedule` is accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Signed percentage. Positive values raise the price, negative values lower it. Zero when
    /// absent.
    #[serde(default, with = "crate::numbers::as_number")]
    pub percent: Decimal,

    /// Ceiling for positive adjustments, floor for negative ones. Ignored when not positive, and
    /// zero when absent.
    #[serde(default, with = "crate::numbers::as_string")]
    pub cap: Decimal,

    /// Five-field cron expression selecting the minutes the rule applies in. Absent or `null`
    /// means every minute.
    #[serde(
        rename = "shedule",
        alias = "schedule",
        default = "every_minute",
        deserialize_with = "schedule_or_every_minute"
    )]
    pub schedule: String,

    /// Absolute window the rule is restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl DiscountRule {
    /// Create a rule that applies at every minute, without a period.
    #[must_use]
    pub fn new(percent: Decimal, cap: Decimal) -> Self {
        Self {
            percent,
            cap,
            schedule: EVERY_MINUTE.to_string(),
            period: None,
        }
    }

    /// Restrict the rule to a cron schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    /// Restrict the rule to a period.
    #[must_use]
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }
}

fn every_minute() -> String {
    EVERY_MINUTE.to_string()
}

fn schedule_or_every_minute<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(every_minute))
}

/// Decode a stored rule list.
///
/// Missing, empty or malformed text decodes to no rules. Within a readable list, an entry that
/// cannot be decoded is skipped and the remaining rules are kept in order.
#[must_use]
pub fn parse_rules(text: &str) -> Vec<DiscountRule> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let entries: Vec<Value> = match serde_json::from_str(text) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(%error, "unreadable discount rules; treating as none");

            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(rule) => Some(rule),
            Err(error) => {
                warn!(index, %error, "skipping unreadable discount rule");

                None
            }
        })
        .collect()
}

/// Encode a rule list for storage.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn format_rules(rules: &[DiscountRule]) -> Result<String, serde_json::Error> {
    serde_json::to_string(rules)
}
