//! Expense extraction pipeline
//!
//! Free text goes to the language model with a strict extraction prompt. The
//! first JSON array in the reply is validated as a whole; only when every
//! element is usable are the records appended, in order, to the ledger.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::recorder::LedgerWriter;
use crate::config::CategorySet;
use crate::error::{TrackerError, TrackerResult};
use crate::llm::{extract_first_json_array, prompts, LanguageModel};
use crate::models::{validate_amount, ExpenseRecord};

/// One validated element of the model's array, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseCandidate {
    pub description: String,
    pub amount: f64,
    /// Canonical label, or `None` when the model gave nothing usable
    pub category: Option<String>,
}

/// Records written for one message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    pub records: Vec<ExpenseRecord>,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn total(&self) -> f64 {
        self.records.iter().map(|r| r.amount).sum()
    }

    /// One confirmation line per record, in input order
    pub fn summary(&self, currency: &str) -> String {
        self.records
            .iter()
            .map(|r| {
                format!(
                    "✅ {}: {}{:.2} [{}]",
                    r.description, currency, r.amount, r.category
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Text in, ledger rows out
#[derive(Clone)]
pub struct ExtractionPipeline {
    llm: Arc<dyn LanguageModel>,
    writer: LedgerWriter,
    categories: Arc<CategorySet>,
}

impl ExtractionPipeline {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        writer: LedgerWriter,
        categories: Arc<CategorySet>,
    ) -> Self {
        Self {
            llm,
            writer,
            categories,
        }
    }

    pub fn writer(&self) -> &LedgerWriter {
        &self.writer
    }

    /// Extract and record the expenses in `text`, dated today
    pub async fn process(&self, text: &str) -> TrackerResult<ExtractionReport> {
        self.process_on(Local::now().date_naive(), text).await
    }

    pub async fn process_on(&self, date: NaiveDate, text: &str) -> TrackerResult<ExtractionReport> {
        let prompt = prompts::extraction_prompt(text, &self.categories);
        let response = self.llm.complete(&prompt).await?;
        debug!(response = %response, "extraction response");

        let candidates = parse_candidates(&response, &self.categories)?;

        let mut report = ExtractionReport::default();
        for candidate in candidates {
            let record = self
                .writer
                .record_on(
                    date,
                    &candidate.description,
                    candidate.amount,
                    candidate.category.as_deref(),
                )
                .await?;
            report.records.push(record);
        }

        info!(count = report.len(), "processed message");
        Ok(report)
    }
}

/// Validate the model's reply into candidates; any bad element rejects the
/// whole reply
pub fn parse_candidates(
    response: &str,
    categories: &CategorySet,
) -> TrackerResult<Vec<ExpenseCandidate>> {
    let slice = extract_first_json_array(response)
        .ok_or_else(|| TrackerError::extraction("No JSON array in model response"))?;

    let value: Value = serde_json::from_str(slice)
        .map_err(|e| TrackerError::extraction(format!("Invalid JSON array: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(TrackerError::extraction("Model response is not a JSON array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                TrackerError::extraction(format!("Element {} is not an object", index))
            })?;
            candidate(object, categories)
                .map_err(|reason| TrackerError::extraction(format!("Element {}: {}", index, reason)))
        })
        .collect()
}

fn candidate(object: &Map<String, Value>, categories: &CategorySet) -> Result<ExpenseCandidate, String> {
    let description = object
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or("missing description")?;

    let amount = object
        .get("amount")
        .ok_or("missing amount")
        .and_then(|raw| coerce_amount(raw).ok_or("amount is not a number"))?;
    validate_amount(amount).map_err(|e| e.to_string())?;

    let category = object
        .get("category")
        .and_then(Value::as_str)
        .and_then(|label| categories.canonical(label))
        .map(str::to_string);

    Ok(ExpenseCandidate {
        description: description.to_string(),
        amount,
        category,
    })
}

/// JSON numbers as-is; strings parsed after trimming and dropping thousands
/// separators
fn coerce_amount(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierStrategy;
    use crate::llm::testing::ScriptedModel;
    use crate::models::MonthKey;
    use crate::services::classifier::CategoryClassifier;
    use crate::storage::LedgerStore;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn month() -> MonthKey {
        MonthKey::from_date(date())
    }

    fn pipeline(dir: &TempDir, model: ScriptedModel) -> ExtractionPipeline {
        let categories = Arc::new(CategorySet::default());
        let llm: Arc<dyn LanguageModel> = Arc::new(model);
        let classifier =
            CategoryClassifier::from_settings(ClassifierStrategy::Keyword, categories.clone(), llm.clone());
        let writer = LedgerWriter::new(LedgerStore::new(dir.path()), classifier);
        ExtractionPipeline::new(llm, writer, categories)
    }

    #[tokio::test]
    async fn test_records_every_element_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&[r#"[
                {"description": "coffee", "amount": 50, "category": "Food"},
                {"description": "taxi", "amount": 200, "category": "Transport"},
                {"description": "milk", "amount": 42.5, "category": "Groceries"}
            ]"#]),
        );

        let report = pipeline.process_on(date(), "coffee 50, taxi 200, milk 42.5").await.unwrap();

        let descriptions: Vec<_> = report.records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["coffee", "taxi", "milk"]);
        assert_eq!(report.summary("₹").lines().count(), 3);

        let rows = pipeline.writer().store().read(month()).unwrap();
        assert_eq!(rows, report.records);
    }

    #[tokio::test]
    async fn test_summary_lines() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&[
                r#"[{"description":"coffee","amount":50,"category":"Food"},{"description":"rent","amount":"12,000","category":"rent"}]"#,
            ]),
        );

        let report = pipeline.process_on(date(), "coffee 50 rent 12000").await.unwrap();
        assert_eq!(
            report.summary("₹"),
            "✅ coffee: ₹50.00 [Food]\n✅ rent: ₹12000.00 [Rent]"
        );
        assert_eq!(report.total(), 12050.0);
    }

    #[tokio::test]
    async fn test_array_inside_markdown_fence() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&[
                "Here are your expenses:\n```json\n[{\"description\": \"lunch\", \"amount\": 120, \"category\": \"Food\"}]\n```",
            ]),
        );

        let report = pipeline.process_on(date(), "lunch 120").await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].amount, 120.0);
    }

    #[tokio::test]
    async fn test_no_array_persists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&["Sorry, I could not find any expenses."]),
        );

        let err = pipeline.process_on(date(), "hello there").await.unwrap_err();
        assert!(err.is_extraction());
        assert!(!pipeline.writer().store().exists(month()));
    }

    #[tokio::test]
    async fn test_numeric_string_amount_is_coerced() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&[r#"[{"description":"milk","amount":"42","category":"Groceries"}]"#]),
        );

        let report = pipeline.process_on(date(), "milk 42").await.unwrap();
        assert_eq!(report.records[0].amount, 42.0);
    }

    #[tokio::test]
    async fn test_non_numeric_amount_rejects_whole_message() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&[
                r#"[{"description":"coffee","amount":50,"category":"Food"},{"description":"milk","amount":"abc","category":"Groceries"}]"#,
            ]),
        );

        let err = pipeline.process_on(date(), "coffee 50 milk abc").await.unwrap_err();
        assert!(err.is_extraction());
        assert!(!pipeline.writer().store().exists(month()));
    }

    #[tokio::test]
    async fn test_unknown_or_missing_category_is_classified() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(
            &temp_dir,
            ScriptedModel::replying(&[
                r#"[{"description":"uber ride","amount":180,"category":"Vehicles"},{"description":"haircut","amount":300}]"#,
            ]),
        );

        let report = pipeline.process_on(date(), "uber 180 haircut 300").await.unwrap();
        assert_eq!(report.records[0].category, "Transport");
        assert_eq!(report.records[1].category, "Other");
    }

    #[tokio::test]
    async fn test_empty_array_is_empty_report() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(&temp_dir, ScriptedModel::replying(&["[]"]));

        let report = pipeline.process_on(date(), "good morning").await.unwrap();
        assert!(report.is_empty());
        assert!(!pipeline.writer().store().exists(month()));
    }

    #[tokio::test]
    async fn test_model_failure_is_llm_error() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(&temp_dir, ScriptedModel::failing("connection refused"));

        let err = pipeline.process_on(date(), "coffee 50").await.unwrap_err();
        assert!(matches!(err, TrackerError::Llm(_)));
        assert!(!err.is_user_caused());
    }

    #[test]
    fn test_parse_candidates_rejects_bad_elements() {
        let categories = CategorySet::default();

        for response in [
            r#"{"description":"coffee","amount":50}"#,
            r#"["coffee"]"#,
            r#"[{"description":"","amount":5}]"#,
            r#"[{"description":"coffee"}]"#,
            r#"[{"description":"coffee","amount":-5}]"#,
            r#"[{"description":"coffee","amount":0}]"#,
            r#"[{"description":"coffee","amount":true}]"#,
        ] {
            let err = parse_candidates(response, &categories).unwrap_err();
            assert!(err.is_extraction(), "expected extraction error for {}", response);
        }
    }

    #[test]
    fn test_parse_candidates_canonicalises_category() {
        let categories = CategorySet::default();
        let candidates =
            parse_candidates(r#"[{"description":" chai ","amount":" 1,250.50 ","category":"FOOD"}]"#, &categories)
                .unwrap();

        assert_eq!(
            candidates,
            vec![ExpenseCandidate {
                description: "chai".to_string(),
                amount: 1250.5,
                category: Some("Food".to_string()),
            }]
        );
    }
}
