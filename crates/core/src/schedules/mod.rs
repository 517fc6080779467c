//! Schedules
//!
//! Five-field cron expressions (minute, hour, day-of-month, month, day-of-week) evaluated in UTC.
//!
//! A schedule is "due" at an instant when the instant's minute is one of its firing minutes. This
//! is decided the way discount rules have always been evaluated: by locating the previous and next
//! firing times around the instant and checking whether either lies within a minute of the
//! instant truncated to the minute.

use std::str::FromStr;

use jiff::{
    SignedDuration, Timestamp,
    civil::{Date, DateTime, Time},
    tz::TimeZone,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::schedules::field::{FieldSet, MonthDays, parse_field};

pub mod field;

pub use field::Field;

/// Schedule that fires every minute.
pub const EVERY_MINUTE: &str = "* * * * *";

/// Number of days searched in either direction for a firing time. Covers the eight year gap
/// between leap days across a skipped century leap year.
const SEARCH_HORIZON_DAYS: u32 = 366 * 8 + 2;

/// Errors raised while parsing or evaluating a cron expression.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The expression did not contain exactly five fields.
    #[error("expected 5 fields in cron expression, found {0}")]
    FieldCount(usize),

    /// An `@` shorthand that is not recognised.
    #[error("unknown cron shorthand: @{0}")]
    UnknownShorthand(String),

    /// A value that is neither a number nor a known name.
    #[error("invalid {field} value: {value:?}")]
    InvalidValue {
        /// Field the value belongs to.
        field: Field,
        /// Offending text.
        value: String,
    },

    /// A value outside the bounds of its field.
    #[error("{field} value {value} outside {min}-{max}")]
    OutOfRange {
        /// Field the value belongs to.
        field: Field,
        /// Offending value.
        value: u8,
        /// Lowest accepted value.
        min: u8,
        /// Highest accepted value.
        max: u8,
    },

    /// A step that is zero or not a number.
    #[error("invalid {field} step: {value:?}")]
    InvalidStep {
        /// Field the step belongs to.
        field: Field,
        /// Offending text.
        value: String,
    },

    /// A range whose start is after its end.
    #[error("invalid {field} range: {value:?}")]
    InvalidRange {
        /// Field the range belongs to.
        field: Field,
        /// Offending text.
        value: String,
    },

    /// No firing time exists within the search horizon (for example `0 0 30 2 *`).
    #[error("schedule never fires within the search horizon")]
    NoFiringTime,

    /// Date arithmetic left the supported range.
    #[error(transparent)]
    Time(#[from] jiff::Error),
}

/// Parsed five-field cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
    month_days_of_month: MonthDays,
    month_days_of_week: MonthDays,
    day_of_month_restricted: bool,
    day_of_week_restricted: bool,
}

impl CronSchedule {
    /// Parse a cron expression.
    ///
    /// Accepts five whitespace separated fields, or one of the `@yearly`, `@annually`,
    /// `@monthly`, `@weekly`, `@daily`, `@midnight` and `@hourly` shorthands. Day-of-month also
    /// accepts `L` for the last day of the month, and day-of-week accepts `d#n` for the `n`th
    /// weekday `d` and `dL` (or `Ld`) for the last one.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] describing the first invalid field.
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let trimmed = expression.trim();

        let expanded = match trimmed.strip_prefix('@') {
            Some(shorthand) => expand_shorthand(shorthand)?,
            None => trimmed,
        };

        let fields: SmallVec<[&str; 5]> = expanded.split_whitespace().collect();

        let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
            return Err(ScheduleError::FieldCount(fields.len()));
        };

        let minutes = parse_field(Field::Minute, minute)?;
        let hours = parse_field(Field::Hour, hour)?;
        let days_of_month = parse_field(Field::DayOfMonth, day_of_month)?;
        let months = parse_field(Field::Month, month)?;
        let days_of_week = parse_field(Field::DayOfWeek, day_of_week)?;

        Ok(Self {
            minutes: minutes.values,
            hours: hours.values,
            days_of_month: days_of_month.values,
            months: months.values,
            days_of_week: days_of_week.values,
            month_days_of_month: days_of_month.month_days,
            month_days_of_week: days_of_week.month_days,
            day_of_month_restricted: days_of_month.restricted,
            day_of_week_restricted: days_of_week.restricted,
        })
    }

    /// Whether the schedule fires at the minute of `datetime`. Seconds are ignored.
    #[must_use]
    pub fn matches(&self, datetime: DateTime) -> bool {
        self.matches_date(datetime.date())
            && self.hours.contains(datetime.hour().unsigned_abs())
            && self.minutes.contains(datetime.minute().unsigned_abs())
    }

    /// Earliest firing time strictly after `instant`.
    ///
    /// Returns `None` when the schedule does not fire within the search horizon.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic leaves the supported range.
    pub fn next_after(&self, instant: Timestamp) -> Result<Option<Timestamp>, ScheduleError> {
        let start = minute_floor(instant)?.checked_add(SignedDuration::from_mins(1))?;

        let mut date = start.date();
        let mut from = start.time();

        for _ in 0..SEARCH_HORIZON_DAYS {
            if self.matches_date(date)
                && let Some(time) = self.first_time_from(from)?
            {
                return Ok(Some(to_timestamp(date.to_datetime(time))?));
            }

            date = date.tomorrow()?;
            from = Time::midnight();
        }

        Ok(None)
    }

    /// Latest firing time at or before `instant`, at minute granularity.
    ///
    /// An instant inside a firing minute returns the start of that minute.
    ///
    /// # Errors
    ///
    /// Returns an error if date arithmetic leaves the supported range.
    pub fn previous_at_or_before(
        &self,
        instant: Timestamp,
    ) -> Result<Option<Timestamp>, ScheduleError> {
        let start = minute_floor(instant)?;

        let mut date = start.date();
        let mut until = start.time();

        for _ in 0..SEARCH_HORIZON_DAYS {
            if self.matches_date(date)
                && let Some(time) = self.last_time_until(until)?
            {
                return Ok(Some(to_timestamp(date.to_datetime(time))?));
            }

            date = date.yesterday()?;
            until = Time::new(23, 59, 0, 0)?;
        }

        Ok(None)
    }

    /// Whether the schedule is due at `now`: the previous or next firing time lies within sixty
    /// seconds of `now` truncated to the minute.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoFiringTime`] when the schedule never fires within the search
    /// horizon, or a time error if date arithmetic leaves the supported range.
    pub fn is_due(&self, now: Timestamp) -> Result<bool, ScheduleError> {
        let minute = to_timestamp(minute_floor(now)?)?;

        let previous = self
            .previous_at_or_before(now)?
            .ok_or(ScheduleError::NoFiringTime)?;

        let next = self.next_after(now)?.ok_or(ScheduleError::NoFiringTime)?;

        Ok(within_a_minute(minute, previous) || within_a_minute(minute, next))
    }

    fn matches_date(&self, date: Date) -> bool {
        if !self.months.contains(date.month().unsigned_abs()) {
            return false;
        }

        let day_of_month = self.days_of_month.contains(date.day().unsigned_abs())
            || self.month_days_of_month.matches(date);

        let day_of_week = self
            .days_of_week
            .contains(date.weekday().to_sunday_zero_offset().unsigned_abs())
            || self.month_days_of_week.matches(date);

        // When both day fields are restricted either one may match.
        if self.day_of_month_restricted && self.day_of_week_restricted {
            day_of_month || day_of_week
        } else {
            day_of_month && day_of_week
        }
    }

    fn first_time_from(&self, from: Time) -> Result<Option<Time>, ScheduleError> {
        for hour in from.hour()..24 {
            if !self.hours.contains(hour.unsigned_abs()) {
                continue;
            }

            let first_minute = if hour == from.hour() { from.minute() } else { 0 };

            if let Some(minute) =
                (first_minute..60).find(|minute| self.minutes.contains(minute.unsigned_abs()))
            {
                return Ok(Some(Time::new(hour, minute, 0, 0)?));
            }
        }

        Ok(None)
    }

    fn last_time_until(&self, until: Time) -> Result<Option<Time>, ScheduleError> {
        for hour in (0..=until.hour()).rev() {
            if !self.hours.contains(hour.unsigned_abs()) {
                continue;
            }

            let last_minute = if hour == until.hour() {
                until.minute()
            } else {
                59
            };

            if let Some(minute) = (0..=last_minute)
                .rev()
                .find(|minute| self.minutes.contains(minute.unsigned_abs()))
            {
                return Ok(Some(Time::new(hour, minute, 0, 0)?));
            }
        }

        Ok(None)
    }
}

impl FromStr for CronSchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn expand_shorthand(shorthand: &str) -> Result<&'static str, ScheduleError> {
    match shorthand.to_ascii_lowercase().as_str() {
        "yearly" | "annually" => Ok("0 0 1 1 *"),
        "monthly" => Ok("0 0 1 * *"),
        "weekly" => Ok("0 0 * * 0"),
        "daily" | "midnight" => Ok("0 0 * * *"),
        "hourly" => Ok("0 * * * *"),
        _ => Err(ScheduleError::UnknownShorthand(shorthand.to_string())),
    }
}

fn minute_floor(instant: Timestamp) -> Result<DateTime, ScheduleError> {
    let datetime = instant.to_zoned(TimeZone::UTC).datetime();
    let time = Time::new(datetime.hour(), datetime.minute(), 0, 0)?;

    Ok(datetime.date().to_datetime(time))
}

fn to_timestamp(datetime: DateTime) -> Result<Timestamp, ScheduleError> {
    Ok(datetime.to_zoned(TimeZone::UTC)?.timestamp())
}

fn within_a_minute(a: Timestamp, b: Timestamp) -> bool {
    a.duration_since(b).abs() < SignedDuration::from_secs(60)
}
