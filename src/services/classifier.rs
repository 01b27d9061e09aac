//! Category classification
//!
//! Maps an expense description to exactly one label of the configured
//! [`CategorySet`], or `Other`. The strategy is chosen once from settings.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{CategorySet, ClassifierStrategy, OTHER_CATEGORY};
use crate::error::{TrackerError, TrackerResult};
use crate::llm::{extract_first_json_object, prompts, LanguageModel};

/// First-match keyword lookup
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    categories: Arc<CategorySet>,
}

impl KeywordClassifier {
    pub fn new(categories: Arc<CategorySet>) -> Self {
        Self { categories }
    }

    /// The first category (in set order) with a keyword contained in the
    /// description wins
    pub fn classify(&self, description: &str) -> String {
        let lowered = description.to_lowercase();
        self.categories
            .rules()
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| OTHER_CATEGORY.to_string())
    }
}

/// Asks the language model for the category
#[derive(Clone)]
pub struct DelegatedClassifier {
    llm: Arc<dyn LanguageModel>,
    categories: Arc<CategorySet>,
}

impl DelegatedClassifier {
    pub fn new(llm: Arc<dyn LanguageModel>, categories: Arc<CategorySet>) -> Self {
        Self { llm, categories }
    }

    pub async fn try_classify(&self, description: &str) -> TrackerResult<String> {
        let prompt = prompts::classification_prompt(description, &self.categories);
        let response = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| TrackerError::Classification(e.to_string()))?;

        let object = extract_first_json_object(&response).ok_or_else(|| {
            TrackerError::Classification("No JSON object in model response".into())
        })?;

        let value: Value = serde_json::from_str(object).map_err(|e| {
            TrackerError::Classification(format!("Invalid JSON in model response: {}", e))
        })?;

        let label = value
            .get("category")
            .and_then(Value::as_str)
            .ok_or_else(|| TrackerError::Classification("Response has no category field".into()))?;

        self.categories
            .canonical(label)
            .map(str::to_string)
            .ok_or_else(|| TrackerError::Classification(format!("Unknown category '{}'", label)))
    }
}

/// The configured classification strategy
#[derive(Clone)]
pub enum CategoryClassifier {
    Keyword(KeywordClassifier),
    Delegated(DelegatedClassifier),
}

impl CategoryClassifier {
    /// Build the classifier selected in settings
    pub fn from_settings(
        strategy: ClassifierStrategy,
        categories: Arc<CategorySet>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        match strategy {
            ClassifierStrategy::Keyword => Self::Keyword(KeywordClassifier::new(categories)),
            ClassifierStrategy::Delegated => {
                Self::Delegated(DelegatedClassifier::new(llm, categories))
            }
        }
    }

    pub fn strategy(&self) -> ClassifierStrategy {
        match self {
            Self::Keyword(_) => ClassifierStrategy::Keyword,
            Self::Delegated(_) => ClassifierStrategy::Delegated,
        }
    }

    /// Classify, reporting why no label could be produced
    pub async fn try_classify(&self, description: &str) -> TrackerResult<String> {
        match self {
            Self::Keyword(keyword) => Ok(keyword.classify(description)),
            Self::Delegated(delegated) => delegated.try_classify(description).await,
        }
    }

    /// Classify, degrading to `Other` on any failure
    pub async fn classify(&self, description: &str) -> String {
        match self.try_classify(description).await {
            Ok(label) => {
                debug!(description, category = %label, "classified expense");
                label
            }
            Err(e) => {
                warn!(description, error = %e, "classification failed, using {}", OTHER_CATEGORY);
                OTHER_CATEGORY.to_string()
            }
        }
    }
}
