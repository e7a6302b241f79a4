//! Local calendar date value type.
//!
//! Every date inside the core is a [`LocalDate`]. It orders like a calendar
//! date, prints and serializes as `YYYY-MM-DD`, and is only converted to and
//! from SQL text at the storage boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const ISO_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalDate(NaiveDate);

impl LocalDate {
    /// Parse a strict `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(s.trim(), ISO_FORMAT)
            .map(LocalDate)
            .map_err(|_| ValidationError::InvalidDate(s.to_string()))
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// The day before. Saturates at the minimum representable date.
    pub fn previous(self) -> Self {
        self.0.checked_sub_days(Days::new(1)).map_or(self, LocalDate)
    }

    /// The day after. Saturates at the maximum representable date.
    pub fn next(self) -> Self {
        self.0.checked_add_days(Days::new(1)).map_or(self, LocalDate)
    }

    pub fn add_days(self, days: u64) -> Self {
        self.0.checked_add_days(Days::new(days)).map_or(self, LocalDate)
    }

    pub fn sub_days(self, days: u64) -> Self {
        self.0.checked_sub_days(Days::new(days)).map_or(self, LocalDate)
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// ISO weekday number: Monday = 1 .. Sunday = 7.
    pub fn weekday_number(&self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Every date in `[self, end]`, ascending. Empty when `end < self`.
    pub fn through(self, end: LocalDate) -> impl Iterator<Item = LocalDate> {
        self.0
            .iter_days()
            .take_while(move |d| *d <= end.0)
            .map(LocalDate)
    }
}

impl From<NaiveDate> for LocalDate {
    fn from(date: NaiveDate) -> Self {
        LocalDate(date)
    }
}

impl fmt::Display for LocalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl FromStr for LocalDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocalDate::parse(s)
    }
}

impl TryFrom<String> for LocalDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LocalDate::parse(&value)
    }
}

impl From<LocalDate> for String {
    fn from(date: LocalDate) -> Self {
        date.to_string()
    }
}
