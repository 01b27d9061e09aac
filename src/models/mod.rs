//! Core data models for the expense tracker
//!
//! Expense records and the month keys that name their ledgers.

pub mod expense;
pub mod month;

pub use expense::{validate_amount, ExpenseRecord, LEDGER_HEADER};
pub use month::MonthKey;
