//! Periods
//!
//! Absolute validity windows. Bounds are stored as text in the catalog's day-first format
//! (`DD-MM-YYYYTHH:MM:SSZ`, always UTC) and only parsed when a window is evaluated.

use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// `strptime` format of period bounds. Day first, not ISO 8601 field order.
pub const PERIOD_FORMAT: &str = "%d-%m-%YT%H:%M:%SZ";

/// Errors raised while parsing a period bound.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// The bound did not match [`PERIOD_FORMAT`].
    #[error("invalid period timestamp {value:?}, expected DD-MM-YYYYTHH:MM:SSZ")]
    InvalidTimestamp {
        /// Offending text.
        value: String,

        /// Underlying parse error.
        #[source]
        source: jiff::Error,
    },
}

/// Parse a bound in [`PERIOD_FORMAT`] as a UTC instant.
///
/// # Errors
///
/// Returns [`PeriodError::InvalidTimestamp`] if `value` does not match the format or names an
/// impossible date.
pub fn parse_period_timestamp(value: &str) -> Result<Timestamp, PeriodError> {
    DateTime::strptime(PERIOD_FORMAT, value)
        .and_then(|datetime| datetime.to_zoned(TimeZone::UTC))
        .map(|zoned| zoned.timestamp())
        .map_err(|source| PeriodError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

/// Format an instant in [`PERIOD_FORMAT`].
#[must_use]
pub fn format_period_timestamp(instant: Timestamp) -> String {
    instant.strftime(PERIOD_FORMAT).to_string()
}

/// Validity window of a discount rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Inclusive start, in [`PERIOD_FORMAT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_start: Option<String>,

    /// Inclusive end, in [`PERIOD_FORMAT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_end: Option<String>,
}

impl Period {
    /// Create a period covering `start..=end`.
    #[must_use]
    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            datetime_start: Some(format_period_timestamp(start)),
            datetime_end: Some(format_period_timestamp(end)),
        }
    }

    /// Whether `now` falls within the period.
    ///
    /// A period with a missing or empty bound places no restriction. When both bounds are
    /// present but either fails to parse, the period matches nothing.
    #[must_use]
    pub fn contains(&self, now: Timestamp) -> bool {
        let (Some(start), Some(end)) = (self.start(), self.end()) else {
            return true;
        };

        match (parse_period_timestamp(start), parse_period_timestamp(end)) {
            (Ok(start), Ok(end)) => start <= now && now <= end,
            (Err(error), _) | (_, Err(error)) => {
                warn!(%error, "unparseable discount period; treating rule as inactive");

                false
            }
        }
    }

    fn start(&self) -> Option<&str> {
        self.datetime_start.as_deref().filter(|start| !start.is_empty())
    }

    fn end(&self) -> Option<&str> {
        self.datetime_end.as_deref().filter(|end| !end.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn year_2025() -> Period {
        Period {
            datetime_start: Some("01-01-2025T00:00:00Z".to_string()),
            datetime_end: Some("31-12-2025T23:59:59Z".to_string()),
        }
    }

    #[test]
    fn parses_day_first_format() -> TestResult {
        let parsed = parse_period_timestamp("31-12-2025T23:59:59Z")?;

        assert_eq!(parsed, "2025-12-31T23:59:59Z".parse()?);

        Ok(())
    }

    #[test]
    fn rejects_iso_field_order() {
        assert!(parse_period_timestamp("2025-12-31T23:59:59Z").is_err());
        assert!(parse_period_timestamp("12-31-2025T23:59:59Z").is_err());
        assert!(parse_period_timestamp("31-02-2025T00:00:00Z").is_err());
    }

    #[test]
    fn formats_day_first() -> TestResult {
        let instant: Timestamp = "2025-06-05T07:08:09Z".parse()?;

        assert_eq!(format_period_timestamp(instant), "05-06-2025T07:08:09Z");

        Ok(())
    }

    #[test]
    fn bounds_are_inclusive() -> TestResult {
        let period = year_2025();

        assert!(period.contains("2025-01-01T00:00:00Z".parse()?));
        assert!(period.contains("2025-06-15T12:00:00Z".parse()?));
        assert!(period.contains("2025-12-31T23:59:59Z".parse()?));
        assert!(!period.contains("2024-12-31T23:59:59Z".parse()?));
        assert!(!period.contains("2026-01-01T00:00:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn missing_bound_places_no_restriction() -> TestResult {
        let now = "2030-01-01T00:00:00Z".parse()?;

        let open_ended = Period {
            datetime_start: Some("01-01-2025T00:00:00Z".to_string()),
            datetime_end: None,
        };

        let empty_end = Period {
            datetime_start: Some("01-01-2025T00:00:00Z".to_string()),
            datetime_end: Some(String::new()),
        };

        assert!(open_ended.contains(now));
        assert!(empty_end.contains(now));
        assert!(Period::default().contains(now));

        Ok(())
    }

    #[test]
    fn malformed_bound_matches_nothing() -> TestResult {
        let period = Period {
            datetime_start: Some("2025-01-01T00:00:00Z".to_string()),
            datetime_end: Some("31-12-2025T23:59:59Z".to_string()),
        };

        assert!(!period.contains("2025-06-15T12:00:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn between_round_trips() -> TestResult {
        let start: Timestamp = "2025-03-01T00:00:00Z".parse()?;
        let end: Timestamp = "2025-03-31T23:59:59Z".parse()?;
        let period = Period::between(start, end);

        assert_eq!(period.datetime_start.as_deref(), Some("01-03-2025T00:00:00Z"));
        assert!(period.contains("2025-03-15T00:00:00Z".parse()?));

        Ok(())
    }
}
