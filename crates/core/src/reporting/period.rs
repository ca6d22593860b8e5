//! Reporting period types.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
}

impl YearMonth {
    /// Creates a month, validating it against the calendar.
    pub fn new(year: i32, month: u32) -> Result<Self, ReportError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| ReportError::InvalidPeriod(format!("{year}-{month} is not a month")))
    }

    /// Returns the month a date falls into.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Period a report covers, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First month.
    pub from: YearMonth,
    /// Last month.
    pub to: YearMonth,
}

impl ReportPeriod {
    /// Creates a period, rejecting ranges that end before they start.
    pub fn new(from: YearMonth, to: YearMonth) -> Result<Self, ReportError> {
        if from > to {
            return Err(ReportError::InvalidPeriod(format!(
                "start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Creates a period covering a single month.
    pub fn month(year: i32, month: u32) -> Result<Self, ReportError> {
        let month = YearMonth::new(year, month)?;
        Ok(Self {
            from: month,
            to: month,
        })
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        let month = YearMonth::of(date);
        month >= self.from && month <= self.to
    }

    /// Display label: `MM/YYYY` or `MM/YYYY-MM/YYYY`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.from == self.to {
            self.from.to_string()
        } else {
            format!("{}-{}", self.from, self.to)
        }
    }
}
