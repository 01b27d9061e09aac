//! Ledger display formatting
//!
//! Renders a month's rows and its category totals as terminal tables.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::models::{ExpenseRecord, MonthKey};
use crate::services::MonthlySummary;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
}

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Total")]
    total: String,
}

/// Format the rows of a month's ledger
pub fn format_ledger_table(month: MonthKey, records: &[ExpenseRecord], currency: &str) -> String {
    if records.is_empty() {
        return format!("No expenses recorded for {}.\n", month);
    }

    let rows = records.iter().map(|r| RecordRow {
        date: r.date.format("%Y-%m-%d").to_string(),
        description: r.description.clone(),
        amount: format!("{}{:.2}", currency, r.amount),
        category: r.category.clone(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()));

    format!("Expenses for {}\n\n{}\n", month, table)
}

/// Format category totals, largest first, with a grand total line
pub fn format_summary_table(summary: &MonthlySummary, currency: &str) -> String {
    if summary.is_empty() {
        return String::new();
    }

    let rows = summary.categories.iter().map(|c| TotalRow {
        category: c.category.clone(),
        count: c.count,
        total: format!("{}{:.2}", currency, c.amount),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(2)).with(Alignment::right()));

    format!(
        "{}\n\nTotal: {}{:.2} ({} expenses)\n",
        table, currency, summary.total, summary.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn records() -> Vec<ExpenseRecord> {
        vec![
            ExpenseRecord::new(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(), "coffee", 50.0, "Food")
                .unwrap(),
            ExpenseRecord::new(NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(), "taxi", 200.0, "Transport")
                .unwrap(),
        ]
    }

    #[test]
    fn test_empty_ledger() {
        let month = MonthKey::new(2025, 1).unwrap();
        assert_eq!(
            format_ledger_table(month, &[], "₹"),
            "No expenses recorded for 2025-01.\n"
        );
    }

    #[test]
    fn test_ledger_table_lists_rows() {
        let month = MonthKey::new(2025, 1).unwrap();
        let output = format_ledger_table(month, &records(), "₹");

        assert!(output.starts_with("Expenses for 2025-01"));
        assert!(output.contains("Description"));
        assert!(output.contains("coffee"));
        assert!(output.contains("₹200.00"));
    }

    #[test]
    fn test_summary_table() {
        let month = MonthKey::new(2025, 1).unwrap();
        let summary = MonthlySummary::from_records(month, &records());
        let output = format_summary_table(&summary, "$");

        assert!(output.contains("Transport"));
        assert!(output.contains("Total: $250.00 (2 expenses)"));
        assert!(output.find("Transport").unwrap() < output.find("Food").unwrap());
    }
}
