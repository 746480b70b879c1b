//! Year-less calendar days.
//!
//! Patterns are defined on a synthetic calendar year: a `MonthDay` is an
//! `MM-DD` label with no year, and a `DateRange` is a pair of them. Ordering
//! and day-of-year arithmetic use a fixed leap reference year so that `02-29`
//! is a legal endpoint and sorts between `02-28` and `03-01`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Leap year every `MonthDay` is placed on for validation and ordering.
pub const REFERENCE_YEAR: i32 = 2024;

/// Days preceding each month in a leap year.
const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid month-day label: '{0}'")]
    InvalidLabel(String),

    #[error("no such calendar day: {month:02}-{day:02}")]
    OutOfRange { month: u32, day: u32 },
}

/// A calendar day without a year, rendered as zero-padded `MM-DD`.
///
/// Field order makes the derived `Ord` match day-of-year order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u8,
    day: u8,
}

impl MonthDay {
    /// Build a month-day, rejecting days that do not exist in a leap year.
    pub fn new(month: u32, day: u32) -> Result<Self, CalendarError> {
        match NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day) {
            Some(_) => Ok(Self {
                month: month as u8,
                day: day as u8,
            }),
            None => Err(CalendarError::OutOfRange { month, day }),
        }
    }

    pub const fn first_of_year() -> Self {
        Self { month: 1, day: 1 }
    }

    pub const fn last_of_year() -> Self {
        Self { month: 12, day: 31 }
    }

    pub fn month(&self) -> u32 {
        u32::from(self.month)
    }

    pub fn day(&self) -> u32 {
        u32::from(self.day)
    }

    /// Day of year in the reference year (1..=366).
    pub fn ordinal(&self) -> u32 {
        DAYS_BEFORE_MONTH[usize::from(self.month - 1)] + u32::from(self.day)
    }

    /// Strip the year from a full date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }

    /// Place this month-day in a concrete year. `None` for `02-29` in a
    /// non-leap year.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month(), self.day())
    }

    /// Parse an axis label.
    ///
    /// Accepts `MM-DD`, unpadded `M-D`, `YYYY-MM-DD`, and ISO date-times whose
    /// first ten characters are a `YYYY-MM-DD` date.
    pub fn parse(label: &str) -> Result<Self, CalendarError> {
        let trimmed = label.trim();
        let invalid = || CalendarError::InvalidLabel(label.to_string());

        if let Some(date_part) = trimmed.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return Ok(Self::from_date(date));
            }
        }

        let (month, day) = trimmed.split_once('-').ok_or_else(invalid)?;
        let month = parse_component(month).ok_or_else(invalid)?;
        let day = parse_component(day).ok_or_else(invalid)?;
        Self::new(month, day)
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Canonical `MM-DD` text for a label, or the label unchanged when it cannot
/// be parsed. Callers that must have a valid day parse the result again.
pub fn normalize_label(label: &str) -> String {
    match MonthDay::parse(label) {
        Ok(md) => md.to_string(),
        Err(_) => label.to_string(),
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MonthDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A pattern window on the synthetic calendar year.
///
/// Stored verbatim: `start` may sort after `end`. Use [`DateRange::normalized`]
/// where an ordered pair is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl DateRange {
    pub fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    /// `01-01` through `12-31`.
    pub fn full_year() -> Self {
        Self::new(MonthDay::first_of_year(), MonthDay::last_of_year())
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Same endpoints, swapped if needed so `start <= end`.
    pub fn normalized(&self) -> Self {
        if self.is_inverted() {
            Self::new(self.end, self.start)
        } else {
            *self
        }
    }

    /// Whether `day` lies inside the normalized range, endpoints included.
    pub fn contains(&self, day: MonthDay) -> bool {
        let r = self.normalized();
        r.start <= day && day <= r.end
    }

    /// Inclusive length of the normalized range in reference-year days.
    pub fn calendar_days(&self) -> u32 {
        let r = self.normalized();
        r.end.ordinal() - r.start.ordinal() + 1
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::full_year()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
