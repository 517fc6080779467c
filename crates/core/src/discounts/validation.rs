//! Discount Validation
//!
//! Write-side checks for rules submitted as loosely typed JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    discounts::DiscountRule,
    numbers::{decimal_from_json, is_decimal},
    periods::{Period, parse_period_timestamp},
    schedules::{CronSchedule, EVERY_MINUTE},
};

/// A discount rule as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountRuleInput {
    /// Percentage, expected to be a number or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Value>,

    /// Clamping bound, expected to be a number or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<Value>,

    /// Cron expression. Absent means every minute.
    #[serde(
        rename = "shedule",
        alias = "schedule",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule: Option<String>,

    /// Optional validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

impl DiscountRuleInput {
    fn schedule(&self) -> &str {
        self.schedule.as_deref().unwrap_or(EVERY_MINUTE)
    }
}

/// Validation failures, one message per problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .messages.join("; "))]
pub struct ValidationErrors {
    /// Human readable messages, in input order.
    pub messages: Vec<String>,
}

/// Check a submitted rule, returning every problem found.
///
/// An empty result means the rule is valid.
#[must_use]
pub fn validate_rule(input: &DiscountRuleInput) -> Vec<String> {
    let mut errors = Vec::new();

    match &input.percent {
        None => errors.push("Missing 'percent' field".to_string()),
        Some(value) if !is_decimal(value) => errors.push("'percent' must be a number".to_string()),
        Some(_) => {}
    }

    match &input.cap {
        None => errors.push("Missing 'cap' field".to_string()),
        Some(value) if !is_decimal(value) => errors.push("'cap' must be a number".to_string()),
        Some(_) => {}
    }

    let schedule = input.schedule();

    if CronSchedule::parse(schedule).is_err() {
        errors.push(format!("Invalid cron schedule: {schedule}"));
    }

    if let Some(period) = &input.period {
        let bounds = [
            ("datetime_start", period.datetime_start.as_deref()),
            ("datetime_end", period.datetime_end.as_deref()),
        ];

        for (name, bound) in bounds {
            if let Some(bound) = bound.filter(|bound| !bound.is_empty())
                && parse_period_timestamp(bound).is_err()
            {
                errors.push(format!("Invalid {name} format: {bound}"));
            }
        }
    }

    errors
}

/// Validate and convert a rule list.
///
/// Either every rule converts or none does.
///
/// # Errors
///
/// Returns [`ValidationErrors`] with each message prefixed by `Discount {index}: `.
pub fn validate_rules(inputs: &[DiscountRuleInput]) -> Result<Vec<DiscountRule>, ValidationErrors> {
    let messages: Vec<String> = inputs
        .iter()
        .enumerate()
        .flat_map(|(index, input)| {
            validate_rule(input)
                .into_iter()
                .map(move |message| format!("Discount {index}: {message}"))
        })
        .collect();

    if !messages.is_empty() {
        return Err(ValidationErrors { messages });
    }

    inputs
        .iter()
        .cloned()
        .map(DiscountRule::try_from)
        .collect()
}

impl TryFrom<DiscountRuleInput> for DiscountRule {
    type Error = ValidationErrors;

    fn try_from(input: DiscountRuleInput) -> Result<Self, Self::Error> {
        let messages = validate_rule(&input);

        let (Some(percent), Some(cap)) = (
            input.percent.as_ref().and_then(decimal_from_json),
            input.cap.as_ref().and_then(decimal_from_json),
        ) else {
            return Err(ValidationErrors { messages });
        };

        if !messages.is_empty() {
            return Err(ValidationErrors { messages });
        }

        Ok(Self {
            percent,
            cap,
            schedule: input.schedule().to_string(),
            period: input.period,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn input(value: Value) -> Result<DiscountRuleInput, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn valid_rule_has_no_errors() -> TestResult {
        let rule = input(json!({
            "percent": -10,
            "cap": "80",
            "shedule": "0 9-17 * * 1-5",
            "period": {
                "datetime_start": "01-01-2025T00:00:00Z",
                "datetime_end": "31-12-2025T23:59:59Z"
            }
        }))?;

        assert!(validate_rule(&rule).is_empty());

        Ok(())
    }

    #[test]
    fn reports_missing_fields() {
        assert_eq!(
            validate_rule(&DiscountRuleInput::default()),
            vec![
                "Missing 'percent' field".to_string(),
                "Missing 'cap' field".to_string(),
            ]
        );
    }

    #[test]
    fn reports_non_numeric_fields() -> TestResult {
        let rule = input(json!({"percent": "ten", "cap": [80]}))?;

        assert_eq!(
            validate_rule(&rule),
            vec![
                "'percent' must be a number".to_string(),
                "'cap' must be a number".to_string(),
            ]
        );

        Ok(())
    }

    #[test]
    fn reports_bad_schedule_and_period() -> TestResult {
        let rule = input(json!({
            "percent": 5,
            "cap": 0,
            "shedule": "61 * * * *",
            "period": {
                "datetime_start": "2025-01-01T00:00:00Z",
                "datetime_end": "32-01-2025T00:00:00Z"
            }
        }))?;

        assert_eq!(
            validate_rule(&rule),
            vec![
                "Invalid cron schedule: 61 * * * *".to_string(),
                "Invalid datetime_start format: 2025-01-01T00:00:00Z".to_string(),
                "Invalid datetime_end format: 32-01-2025T00:00:00Z".to_string(),
            ]
        );

        Ok(())
    }

    #[test]
    fn month_relative_schedules_are_valid() -> TestResult {
        for schedule in ["0 12 L * *", "0 9 * * fri#2", "0 9 * * 5L"] {
            let rule = input(json!({"percent": -10, "cap": "0", "shedule": schedule}))?;

            assert!(validate_rule(&rule).is_empty(), "{schedule} should be accepted");
        }

        Ok(())
    }

    #[test]
    fn half_open_period_is_valid() -> TestResult {
        let rule = input(json!({
            "percent": 5,
            "cap": 0,
            "period": {"datetime_start": "01-01-2025T00:00:00Z"}
        }))?;

        assert!(validate_rule(&rule).is_empty());

        Ok(())
    }

    #[test]
    fn validate_rules_prefixes_index() -> TestResult {
        let rules = [
            input(json!({"percent": 5, "cap": "10"}))?,
            input(json!({"cap": "10", "shedule": "bad"}))?,
        ];

        let Err(errors) = validate_rules(&rules) else {
            return Err("expected validation to fail".into());
        };

        assert_eq!(
            errors.messages,
            vec![
                "Discount 1: Missing 'percent' field".to_string(),
                "Discount 1: Invalid cron schedule: bad".to_string(),
            ]
        );

        Ok(())
    }

    #[test]
    fn validate_rules_converts_all() -> TestResult {
        let rules = [
            input(json!({"percent": "15", "cap": 150}))?,
            input(json!({"percent": -10.5, "cap": "80", "schedule": "@hourly"}))?,
        ];

        let converted = validate_rules(&rules)?;

        assert_eq!(
            converted,
            vec![
                DiscountRule::new(Decimal::new(15, 0), Decimal::new(150, 0)),
                DiscountRule::new(Decimal::new(-105, 1), Decimal::new(80, 0))
                    .with_schedule("@hourly"),
            ]
        );

        Ok(())
    }

    #[test]
    fn errors_display_joined() {
        let errors = ValidationErrors {
            messages: vec!["a".to_string(), "b".to_string()],
        };

        assert_eq!(errors.to_string(), "a; b");
    }
}
