//! Monthly ledger files
//!
//! One CSV file per calendar month, `expenses_<YYYY-MM>.csv`, with the header
//! `Date,Description,Amount,Category` written once when the file is created.
//! Rows are only ever appended.

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use super::file_io::{append_synced, write_atomic};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{ExpenseRecord, MonthKey, LEDGER_HEADER};

const LEDGER_EXTENSION: &str = "csv";

/// File name of the ledger for a month
pub fn ledger_file_name(month: MonthKey) -> String {
    format!("expenses_{}.{}", month, LEDGER_EXTENSION)
}

/// Directory of monthly ledgers
#[derive(Debug, Clone)]
pub struct LedgerStore {
    dir: PathBuf,
}

impl LedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the ledger for a month (which may not exist yet)
    pub fn path_for(&self, month: MonthKey) -> PathBuf {
        self.dir.join(ledger_file_name(month))
    }

    pub fn exists(&self, month: MonthKey) -> bool {
        self.path_for(month).is_file()
    }

    /// Append a record to its month's ledger, creating the file with its
    /// header first if needed
    pub fn append(&self, record: &ExpenseRecord) -> TrackerResult<PathBuf> {
        let month = MonthKey::from_date(record.date);
        let path = self.path_for(month);

        if path.exists() {
            append_synced(&path, |w| write_rows(w, None, record))?;
            debug!(path = %path.display(), "appended ledger row");
        } else {
            write_atomic(&path, |w| write_rows(w, Some(&LEDGER_HEADER), record))?;
            info!(path = %path.display(), month = %month, "created ledger");
        }

        Ok(path)
    }

    /// Read every record of a month; a missing ledger reads as empty
    pub fn read(&self, month: MonthKey) -> TrackerResult<Vec<ExpenseRecord>> {
        let path = self.path_for(month);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| TrackerError::storage(&path, e))?;

        reader
            .deserialize::<ExpenseRecord>()
            .map(|row| row.map_err(|e| TrackerError::storage(&path, e)))
            .collect()
    }

    /// Raw bytes of a month's ledger, if it exists
    pub fn read_bytes(&self, month: MonthKey) -> TrackerResult<Option<Vec<u8>>> {
        let path = self.path_for(month);
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read(&path)
            .map(Some)
            .map_err(|e| TrackerError::storage(&path, e))
    }
}

fn write_rows<W: Write>(
    writer: W,
    header: Option<&[&str; 4]>,
    record: &ExpenseRecord,
) -> TrackerResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if let Some(header) = header {
        csv_writer.write_record(header)?;
    }
    csv_writer.serialize(record)?;
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(day: u32, description: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            description,
            amount,
            "Food",
        )
        .unwrap()
    }

    #[test]
    fn test_file_name_convention() {
        let month = MonthKey::new(2025, 1).unwrap();
        assert_eq!(ledger_file_name(month), "expenses_2025-01.csv");
    }

    #[test]
    fn test_same_month_shares_file_and_header_once() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());

        let first = store.append(&record(3, "coffee", 50.0)).unwrap();
        let second = store.append(&record(28, "lunch", 120.5)).unwrap();
        assert_eq!(first, second);

        let contents = std::fs::read_to_string(&first).unwrap();
        assert_eq!(contents.matches("Date,Description,Amount,Category").count(), 1);
        assert_eq!(
            contents,
            "Date,Description,Amount,Category\n\
             2025-01-03,coffee,50.0,Food\n\
             2025-01-28,lunch,120.5,Food\n"
        );
    }

    #[test]
    fn test_new_month_gets_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());

        store.append(&record(31, "rent", 900.0)).unwrap();
        let february = ExpenseRecord::new(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            "rent",
            900.0,
            "Rent",
        )
        .unwrap();
        store.append(&february).unwrap();

        assert!(store.exists(MonthKey::new(2025, 1).unwrap()));
        assert!(store.exists(MonthKey::new(2025, 2).unwrap()));
        assert_eq!(store.read(MonthKey::new(2025, 2).unwrap()).unwrap(), vec![february]);
    }

    #[test]
    fn test_duplicate_records_are_not_merged() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());
        let coffee = record(5, "coffee", 50.0);

        store.append(&coffee).unwrap();
        store.append(&coffee).unwrap();

        let rows = store.read(MonthKey::new(2025, 1).unwrap()).unwrap();
        assert_eq!(rows, vec![coffee.clone(), coffee]);
    }

    #[test]
    fn test_descriptions_with_commas_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());
        let tricky = record(9, "bread, \"sourdough\"", 80.0);

        store.append(&tricky).unwrap();

        assert_eq!(store.read(MonthKey::new(2025, 1).unwrap()).unwrap(), vec![tricky]);
    }

    #[test]
    fn test_missing_month_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());
        let month = MonthKey::new(2030, 6).unwrap();

        assert!(!store.exists(month));
        assert!(store.read(month).unwrap().is_empty());
        assert!(store.read_bytes(month).unwrap().is_none());
    }

    #[test]
    fn test_read_bytes_returns_exact_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("ledgers"));

        let path = store.append(&record(1, "milk", 30.0)).unwrap();
        let bytes = store.read_bytes(MonthKey::new(2025, 1).unwrap()).unwrap().unwrap();

        assert_eq!(bytes, std::fs::read(path).unwrap());
    }
}
