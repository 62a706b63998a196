//! User-selected billing month.

use std::fmt;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

/// Billing month and year chosen for an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    month: Month,
    year: i32,
}

impl BillingPeriod {
    /// Create a period, checking the year is representable.
    pub fn new(month: Month, year: i32) -> Result<Self, PeriodError> {
        NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
            .ok_or(PeriodError::YearOutOfRange(year))?;
        Ok(Self { month, year })
    }

    /// Parse a month name ("November", "nov") and a year.
    pub fn parse(month: &str, year: i32) -> Result<Self, PeriodError> {
        let month = month
            .trim()
            .parse::<Month>()
            .map_err(|_| PeriodError::UnknownMonth(month.to_string()))?;
        Self::new(month, year)
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        // month() is always 1..=12
        let month = Month::try_from(date.month() as u8).unwrap_or(Month::January);
        Self { month, year: date.year() }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Number of days in the month.
    pub fn last_day(&self) -> u32 {
        let (next_year, next_month) = match self.month {
            Month::December => (self.year + 1, 1),
            m => (self.year, m.number_from_month() + 1),
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(30)
    }

    /// Date stamped on invoices uploaded for this period.
    pub fn invoice_date(&self) -> String {
        format!("01 {} {}", self.month.name(), self.year)
    }

    /// Full-month label stamped on every line item.
    pub fn label(&self) -> String {
        format!(
            "01 {month} {year} - {last:02} {month} {year}",
            month = self.month.name(),
            year = self.year,
            last = self.last_day()
        )
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}
