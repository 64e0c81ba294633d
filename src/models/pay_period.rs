//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type: the calendar month a payroll
//! record covers. Periods travel as `"YYYY-MM"` strings in configuration,
//! JSON bodies and URL paths.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Earliest year accepted for a pay period.
pub const MIN_PERIOD_YEAR: i32 = 2000;

/// Latest year accepted for a pay period.
pub const MAX_PERIOD_YEAR: i32 = 2100;

/// A monthly pay period.
///
/// # Example
///
/// ```
/// use contribution_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period: PayPeriod = "2026-03".parse().unwrap();
///
/// assert_eq!(period.year(), 2026);
/// assert_eq!(period.month(), 3);
/// assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
/// assert_eq!(
///     PayPeriod::containing(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()).unwrap(),
///     period
/// );
/// assert_eq!(period.to_string(), "2026-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayPeriod {
    first_day: NaiveDate,
}

impl PayPeriod {
    /// Creates a pay period for the given year and month.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPeriod`] when the month is outside
    /// 1-12 or the year is outside 2000-2100.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        let label = format!("{:04}-{:02}", year, month);

        if !(MIN_PERIOD_YEAR..=MAX_PERIOD_YEAR).contains(&year) {
            return Err(EngineError::InvalidPeriod {
                value: label,
                message: format!(
                    "year must be between {} and {}",
                    MIN_PERIOD_YEAR, MAX_PERIOD_YEAR
                ),
            });
        }

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EngineError::InvalidPeriod {
                value: label,
                message: "month must be between 1 and 12".to_string(),
            }
        })?;

        Ok(Self { first_day })
    }

    /// Returns the period containing `date`.
    pub fn containing(date: NaiveDate) -> EngineResult<Self> {
        Self::new(date.year(), date.month())
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the period, used to select the effective catalog.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for PayPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| EngineError::InvalidPeriod {
            value: s.to_string(),
            message: message.to_string(),
        };

        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| invalid("expected the YYYY-MM format"))?;

        if year.len() != 4 || month.len() != 2 {
            return Err(invalid("expected the YYYY-MM format"));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| invalid("year is not a number"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| invalid("month is not a number"))?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for PayPeriod {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayPeriod> for String {
    fn from(period: PayPeriod) -> Self {
        period.to_string()
    }
}
