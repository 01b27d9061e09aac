//! Month totals per category

use std::collections::HashMap;

use crate::error::TrackerResult;
use crate::models::{ExpenseRecord, MonthKey};
use crate::storage::LedgerStore;

/// Total spent in one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub count: usize,
    pub amount: f64,
}

/// Totals of one month's ledger
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: MonthKey,
    /// Largest first; ties by name
    pub categories: Vec<CategoryTotal>,
    pub total: f64,
    pub count: usize,
}

impl MonthlySummary {
    pub fn from_records(month: MonthKey, records: &[ExpenseRecord]) -> Self {
        let mut by_category: HashMap<&str, CategoryTotal> = HashMap::new();

        for record in records.iter().filter(|r| month.contains(r.date)) {
            let entry = by_category
                .entry(record.category.as_str())
                .or_insert_with(|| CategoryTotal {
                    category: record.category.clone(),
                    count: 0,
                    amount: 0.0,
                });
            entry.count += 1;
            entry.amount += record.amount;
        }

        let mut categories: Vec<CategoryTotal> = by_category.into_values().collect();
        categories.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            month,
            total: categories.iter().map(|c| c.amount).sum(),
            count: categories.iter().map(|c| c.count).sum(),
            categories,
        }
    }

    /// Summarise a month straight from its ledger
    pub fn load(store: &LedgerStore, month: MonthKey) -> TrackerResult<Self> {
        let records = store.read(month)?;
        Ok(Self::from_records(month, &records))
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Plain text rendering for chat replies
    pub fn to_message(&self, currency: &str) -> String {
        if self.is_empty() {
            return format!("No expenses recorded for {}.", self.month);
        }

        let mut lines = vec![format!("📊 Expenses for {}", self.month)];
        for total in &self.categories {
            lines.push(format!(
                "{}: {}{:.2} ({})",
                total.category, currency, total.amount, total.count
            ));
        }
        lines.push(format!(
            "Total: {}{:.2} across {} expense{}",
            currency,
            self.total,
            self.count,
            if self.count == 1 { "" } else { "s" }
        ));
        lines.join("\n")
    }
}
