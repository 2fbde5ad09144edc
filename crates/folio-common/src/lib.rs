//! Shared domain types for the folio activity pipeline.
//!
//! Both sides of the proxy call speak these types: the proxy builds an
//! [`ActivityPayload`] from upstream data and the widget decodes the same
//! shape from the proxy response (and from its local cache).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest intensity bucket reported by the upstream service.
pub const MAX_LEVEL: u8 = 4;

/// Maximum number of days kept in a payload window.
pub const WINDOW_DAYS: usize = 365;

/// Why a raw contribution entry was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DayError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("level {0} is outside 0..={MAX_LEVEL}")]
    LevelOutOfRange(u8),
}

/// One validated day of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u64,
    pub level: u8,
}

impl ContributionDay {
    /// Build a day from its wire parts, checking the date format and level bucket.
    pub fn parse(date: &str, count: u64, level: u8) -> Result<Self, DayError> {
        if date.len() != 10 {
            return Err(DayError::InvalidDate(date.to_string()));
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| DayError::InvalidDate(date.to_string()))?;
        if level > MAX_LEVEL {
            return Err(DayError::LevelOutOfRange(level));
        }
        Ok(Self { date, count, level })
    }
}

/// The proxy's response contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    /// Oldest first, at most [`WINDOW_DAYS`] entries.
    pub contributions: Vec<ContributionDay>,
    pub last_year_total: u64,
    pub all_time_total: u64,
    /// `"YYYY"` or `"YYYY - YYYY"`.
    pub year_range: String,
}

/// Render the year span covered by `first..=last`.
pub fn year_range(first: NaiveDate, last: NaiveDate) -> String {
    if first.year() == last.year() {
        first.year().to_string()
    } else {
        format!("{} - {}", first.year(), last.year())
    }
}

/// Sum of `count` over the given days.
pub fn sum_counts(days: &[ContributionDay]) -> u64 {
    days.iter().fold(0u64, |acc, d| acc.saturating_add(d.count))
}
