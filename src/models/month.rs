//! Month key used to name ledgers (e.g., "2025-01")

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

/// A calendar month identifying one ledger file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Create a month key, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self, TrackerError> {
        if !(1..=12).contains(&month) {
            return Err(TrackerError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing a date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// Check if a date falls within this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::Validation(format!("Invalid month '{}', expected YYYY-MM", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(MonthKey::new(2025, 1).unwrap().to_string(), "2025-01");
        assert_eq!(MonthKey::new(2025, 12).unwrap().to_string(), "2025-12");
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let key = MonthKey::from_date(date);
        assert_eq!(key, MonthKey::new(2025, 3).unwrap());
        assert!(key.contains(date));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
    }

    #[test]
    fn test_parse() {
        let key: MonthKey = "2024-02".parse().unwrap();
        assert_eq!(key, MonthKey::new(2024, 2).unwrap());

        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024-2".parse::<MonthKey>().is_err());
        assert!("February".parse::<MonthKey>().is_err());
    }
}
