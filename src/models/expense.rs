//! Expense record model
//!
//! One record is one row of a monthly ledger. Field names are renamed to the
//! ledger's column headers so the same struct reads and writes the CSV.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrackerError;

/// Column headers of every ledger file
pub const LEDGER_HEADER: [&str; 4] = ["Date", "Description", "Amount", "Category"];

/// A dated, categorized expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Description")]
    pub description: String,

    /// Always positive
    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Category")]
    pub category: String,
}

impl ExpenseRecord {
    /// Create a validated record
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        let record = Self {
            date,
            description: description.into().trim().to_string(),
            amount,
            category: category.into(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.description.is_empty() {
            return Err(TrackerError::Validation(
                "Expense description cannot be empty".into(),
            ));
        }
        validate_amount(self.amount)?;
        if self.category.trim().is_empty() {
            return Err(TrackerError::Validation(
                "Expense category cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ExpenseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {:.2} [{}]",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.category
        )
    }
}

/// Amounts must be finite and strictly positive
pub fn validate_amount(amount: f64) -> Result<(), TrackerError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(TrackerError::Validation(format!(
            "Amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_new_trims_description() {
        let record = ExpenseRecord::new(day(), "  coffee ", 50.0, "Food").unwrap();
        assert_eq!(record.description, "coffee");
        assert_eq!(record.to_string(), "2025-01-15 coffee: 50.00 [Food]");
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        assert!(ExpenseRecord::new(day(), "coffee", 0.0, "Food").is_err());
        assert!(ExpenseRecord::new(day(), "coffee", -5.0, "Food").is_err());
        assert!(ExpenseRecord::new(day(), "coffee", f64::NAN, "Food").is_err());
        assert!(ExpenseRecord::new(day(), "coffee", f64::INFINITY, "Food").is_err());
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert!(ExpenseRecord::new(day(), "   ", 10.0, "Food").is_err());
        assert!(ExpenseRecord::new(day(), "coffee", 10.0, "").is_err());
    }
}
