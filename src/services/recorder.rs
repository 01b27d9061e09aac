//! Ledger writer
//!
//! Turns a (description, amount, optional category) triple into a dated
//! [`ExpenseRecord`] and appends it to the month's ledger.

use chrono::{Local, NaiveDate};
use tracing::info;

use super::classifier::CategoryClassifier;
use crate::error::TrackerResult;
use crate::models::ExpenseRecord;
use crate::storage::LedgerStore;

/// Appends categorized records to the monthly ledgers
#[derive(Clone)]
pub struct LedgerWriter {
    store: LedgerStore,
    classifier: CategoryClassifier,
}

impl LedgerWriter {
    pub fn new(store: LedgerStore, classifier: CategoryClassifier) -> Self {
        Self { store, classifier }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Record an expense dated today (local time)
    pub async fn record(
        &self,
        description: &str,
        amount: f64,
        category: Option<&str>,
    ) -> TrackerResult<ExpenseRecord> {
        self.record_on(Local::now().date_naive(), description, amount, category)
            .await
    }

    /// Record an expense on an explicit date. Without a category the
    /// classifier picks one.
    pub async fn record_on(
        &self,
        date: NaiveDate,
        description: &str,
        amount: f64,
        category: Option<&str>,
    ) -> TrackerResult<ExpenseRecord> {
        let category = match category {
            Some(label) => label.to_string(),
            None => self.classifier.classify(description).await,
        };

        let record = ExpenseRecord::new(date, description, amount, category)?;
        let path = self.store.append(&record)?;
        info!(record = %record, path = %path.display(), "recorded expense");

        Ok(record)
    }
}
