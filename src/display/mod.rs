//! Display formatting for terminal output

pub mod ledger;

pub use ledger::{format_ledger_table, format_summary_table};
