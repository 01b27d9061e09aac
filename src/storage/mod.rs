//! Storage layer for the expense tracker
//!
//! Monthly CSV ledgers with atomic creation and synced appends.

pub mod file_io;
pub mod ledger;

pub use file_io::{append_synced, write_atomic};
pub use ledger::{ledger_file_name, LedgerStore};
