//! Date type for cashflow records.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

use crate::error::{CoreError, CoreResult};

/// Formats accepted by [`Date::parse`], tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A calendar date on a cashflow record.
///
/// Newtype wrapper around `chrono::NaiveDate`.
///
/// # Example
///
/// ```rust
/// use rollup_core::types::Date;
///
/// let start = Date::from_ymd(2020, 1, 1).unwrap();
/// let end = Date::parse("2021-01-01").unwrap();
/// assert_eq!(start.days_between(&end), 366);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Parses a date from `YYYY-MM-DD`, `YYYY/MM/DD` or `MM/DD/YYYY`.
    ///
    /// A trailing time component (`2024-03-31 00:00:00`) is ignored, which is
    /// how warehouse extracts usually render date columns.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if no format matches.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day of month.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Calculates the number of calendar days from `self` to `other`.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Year fraction from `self` to `other` on an actual/`basis` convention.
    #[must_use]
    pub fn year_fraction(&self, other: &Date, basis: f64) -> f64 {
        self.days_between(other) as f64 / basis
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        other.days_between(&self)
    }
}
