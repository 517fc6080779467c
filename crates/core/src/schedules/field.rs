//! Cron Fields
//!
//! Parsing of a single cron field (`*`, `1-5`, `*/15`, `mon-fri`, ...) into a
//! bitmask of permitted values, plus the month-relative day selectors `L` (last day of the
//! month), `fri#2` (second Friday) and `5L` or `L5` (last Friday).

use std::fmt;

use jiff::civil::Date;
use smallvec::SmallVec;

use crate::schedules::ScheduleError;

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// One of the five positional fields of a cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Minute of the hour, `0-59`.
    Minute,

    /// Hour of the day, `0-23`.
    Hour,

    /// Day of the month, `1-31`.
    DayOfMonth,

    /// Month of the year, `1-12` or `jan-dec`.
    Month,

    /// Day of the week, `0-7` (both `0` and `7` are Sunday) or `sun-sat`.
    DayOfWeek,
}

impl Field {
    /// Inclusive bounds accepted for this field.
    #[must_use]
    pub const fn bounds(self) -> (u8, u8) {
        match self {
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 7),
        }
    }

    /// Human readable field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day-of-month",
            Self::Month => "month",
            Self::DayOfWeek => "day-of-week",
        }
    }

    fn named_value(self, text: &str) -> Option<u8> {
        let lower = text.to_ascii_lowercase();

        let (names, offset): (&[&str], usize) = match self {
            Self::Month => (&MONTH_NAMES, 1),
            Self::DayOfWeek => (&WEEKDAY_NAMES, 0),
            Self::Minute | Self::Hour | Self::DayOfMonth => return None,
        };

        names
            .iter()
            .position(|name| *name == lower)
            .and_then(|index| u8::try_from(index + offset).ok())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of permitted values for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet(u64);

impl FieldSet {
    /// Whether `value` is permitted.
    #[must_use]
    pub const fn contains(self, value: u8) -> bool {
        value < 64 && self.0 & (1 << value) != 0
    }

    /// Whether no value is permitted.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, value: u8) {
        if value < 64 {
            self.0 |= 1 << value;
        }
    }

    fn remove(&mut self, value: u8) {
        if value < 64 {
            self.0 &= !(1 << value);
        }
    }
}

/// Day selectors whose match depends on the length of the month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthDays {
    last_day: bool,
    /// Bit `weekday * 5 + (nth - 1)` for each `weekday#nth`.
    nth_weekdays: u64,
    last_weekdays: FieldSet,
}

impl MonthDays {
    /// Whether `date` is selected.
    #[must_use]
    pub fn matches(self, date: Date) -> bool {
        let day = date.day().unsigned_abs();
        let days_in_month = date.days_in_month().unsigned_abs();
        let weekday = date.weekday().to_sunday_zero_offset().unsigned_abs();

        if self.last_day && day == days_in_month {
            return true;
        }

        if self.last_weekdays.contains(weekday) && day + 7 > days_in_month {
            return true;
        }

        let nth = (day - 1) / 7 + 1;

        self.nth_weekdays & (1 << (weekday * 5 + nth - 1)) != 0
    }

    fn insert_nth(&mut self, weekday: u8, nth: u8) {
        self.nth_weekdays |= 1 << (weekday * 5 + nth - 1);
    }
}

/// Parsed field: the permitted values, any month-relative day selectors, and whether the field
/// was anything other than a bare wildcard. The latter decides how day-of-month and day-of-week
/// combine.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParsedField {
    pub(crate) values: FieldSet,
    pub(crate) month_days: MonthDays,
    pub(crate) restricted: bool,
}

pub(crate) fn parse_field(field: Field, text: &str) -> Result<ParsedField, ScheduleError> {
    let mut values = FieldSet::default();
    let mut month_days = MonthDays::default();
    let parts: SmallVec<[&str; 4]> = text.split(',').collect();

    for part in parts {
        if !parse_month_day(field, part, &mut month_days)? {
            parse_part(field, part, &mut values)?;
        }
    }

    // Sunday is both 0 and 7.
    if field == Field::DayOfWeek && values.contains(7) {
        values.remove(7);
        values.insert(0);
    }

    Ok(ParsedField {
        values,
        month_days,
        restricted: !matches!(text, "*" | "?"),
    })
}

/// Record `part` if it is a month-relative day selector. Returns `false` for anything else.
fn parse_month_day(
    field: Field,
    part: &str,
    month_days: &mut MonthDays,
) -> Result<bool, ScheduleError> {
    match field {
        Field::DayOfMonth if part.eq_ignore_ascii_case("l") => {
            month_days.last_day = true;

            Ok(true)
        }
        Field::DayOfWeek => {
            if let Some((weekday, nth)) = part.split_once('#') {
                let weekday = parse_weekday(weekday)?;

                let nth = match nth.parse::<u8>() {
                    Ok(nth @ 1..=5) => nth,
                    _ => {
                        return Err(ScheduleError::InvalidValue {
                            field,
                            value: part.to_string(),
                        });
                    }
                };

                month_days.insert_nth(weekday, nth);

                return Ok(true);
            }

            let last = part
                .strip_suffix(['L', 'l'])
                .or_else(|| part.strip_prefix(['L', 'l']));

            match last {
                Some(weekday) => {
                    month_days.last_weekdays.insert(parse_weekday(weekday)?);

                    Ok(true)
                }
                None => Ok(false),
            }
        }
        Field::Minute | Field::Hour | Field::DayOfMonth | Field::Month => Ok(false),
    }
}

fn parse_weekday(text: &str) -> Result<u8, ScheduleError> {
    let weekday = parse_value(Field::DayOfWeek, text)?;

    Ok(weekday % 7)
}

fn parse_part(field: Field, part: &str, values: &mut FieldSet) -> Result<(), ScheduleError> {
    let (min, max) = field.bounds();

    let (range, step) = match part.split_once('/') {
        Some((range, step)) => (range, Some(parse_step(field, step)?)),
        None => (part, None),
    };

    let (start, end) = if matches!(range, "*" | "?") {
        (min, max)
    } else if let Some((start, end)) = range.split_once('-') {
        (parse_value(field, start)?, parse_value(field, end)?)
    } else {
        let value = parse_value(field, range)?;

        // `5/15` runs from 5 to the end of the field.
        if step.is_some() {
            (value, max)
        } else {
            (value, value)
        }
    };

    if start > end {
        return Err(ScheduleError::InvalidRange {
            field,
            value: part.to_string(),
        });
    }

    for value in (start..=end).step_by(usize::from(step.unwrap_or(1))) {
        values.insert(value);
    }

    Ok(())
}

fn parse_step(field: Field, text: &str) -> Result<u8, ScheduleError> {
    match text.parse::<u8>() {
        Ok(step) if step > 0 => Ok(step),
        _ => Err(ScheduleError::InvalidStep {
            field,
            value: text.to_string(),
        }),
    }
}

fn parse_value(field: Field, text: &str) -> Result<u8, ScheduleError> {
    let value = text
        .parse::<u8>()
        .ok()
        .or_else(|| field.named_value(text))
        .ok_or_else(|| ScheduleError::InvalidValue {
            field,
            value: text.to_string(),
        })?;

    let (min, max) = field.bounds();

    if !(min..=max).contains(&value) {
        return Err(ScheduleError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }

    Ok(value)
}
