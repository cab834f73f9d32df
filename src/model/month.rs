//! Calendar months used to group transactions.

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month, ordered chronologically by year then month.
///
/// Parsed from the labels people put in a `Month` column:
/// `January2025`, `Jan2025`, `Sept2025`, `January 2025`, `Jan-25`, `2025-01`, `2025/01`,
/// `01/2025`. Month names are case-insensitive and two-digit years are in the 2000s.
///
/// Displays and serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum MonthError {
    #[error("the value is empty")]
    Empty,
    #[error("'{0}' is not a month name")]
    UnknownName(String),
    #[error("'{0}' is not a valid year")]
    InvalidYear(String),
    #[error("month number {0} is not between 1 and 12")]
    OutOfRange(u32),
    #[error("expected something like January2025 or 2025-01")]
    Unrecognized,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) {
            return Err(MonthError::OutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// A human label in the style of the input files, e.g. `January2025`.
    pub fn label(&self) -> String {
        match Month::try_from(self.month as u8) {
            Ok(m) => format!("{}{}", m.name(), self.year),
            Err(_) => self.to_string(),
        }
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MonthError::Empty);
        }
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            parse_numeric(s)
        } else {
            parse_named(s)
        }
    }
}

/// `2025-01`, `2025/01` or `01/2025`.
fn parse_numeric(s: &str) -> Result<MonthKey, MonthError> {
    let (a, b) = s
        .split_once(['-', '/'])
        .ok_or(MonthError::Unrecognized)?;
    let (year, month) = match (a.len(), b.len()) {
        (4, 1..=2) => (a, b),
        (1..=2, 4) => (b, a),
        _ => return Err(MonthError::Unrecognized),
    };
    let year = parse_year(year)?;
    let month: u32 = month.parse().map_err(|_| MonthError::Unrecognized)?;
    MonthKey::new(year, month)
}

/// `January2025`, `Jan 2025`, `Jan-25` and so on.
fn parse_named(s: &str) -> Result<MonthKey, MonthError> {
    let split = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .ok_or(MonthError::Unrecognized)?;
    let (name, rest) = s.split_at(split);
    let month = parse_month_name(name)?;
    let year = rest.trim_start_matches([' ', '-', '_', '.', ',', '/']);
    let year = parse_year(year)?;
    MonthKey::new(year, month)
}

fn parse_month_name(name: &str) -> Result<u32, MonthError> {
    // chrono knows full names and three letter abbreviations
    if name.eq_ignore_ascii_case("sept") {
        return Ok(9);
    }
    Month::from_str(name)
        .map(|m| m.number_from_month())
        .map_err(|_| MonthError::UnknownName(name.to_string()))
}

fn parse_year(s: &str) -> Result<i32, MonthError> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(MonthError::InvalidYear(s.to_string()));
    }
    match s.len() {
        2 => s
            .parse::<i32>()
            .map(|yy| 2000 + yy)
            .map_err(|_| MonthError::InvalidYear(s.to_string())),
        4 => s
            .parse::<i32>()
            .map_err(|_| MonthError::InvalidYear(s.to_string())),
        _ => Err(MonthError::InvalidYear(s.to_string())),
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
