//! Category set and keyword configuration
//!
//! The category file is a mapping of category name to keyword list, in JSON
//! or YAML:
//!
//! ```json
//! { "Groceries": ["milk", "vegetables"], "Travel": ["flight", "hotel"] }
//! ```
//!
//! Document order is kept: the keyword classifier returns the first category
//! whose keywords match, so earlier entries win.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::TrackerError;

/// Label used when no category applies
pub const OTHER_CATEGORY: &str = "Other";

/// One category and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    /// Lowercased keywords
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Whether any keyword occurs in the (already lowercased) text
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && lowered.contains(keyword.as_str()))
    }
}

/// The fixed, read-only set of category labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    rules: Vec<CategoryRule>,
}

impl CategorySet {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Load a category file; the format follows the extension (`.yaml`/`.yml`
    /// for YAML, JSON otherwise)
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!(
                "Failed to read category file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );

        let set = if is_yaml {
            Self::from_yaml(&contents)?
        } else {
            Self::from_json(&contents)?
        };

        if set.is_empty() {
            return Err(TrackerError::Config(format!(
                "Category file {} defines no categories",
                path.display()
            )));
        }

        Ok(set)
    }

    /// Load the file if it exists, otherwise use the built-in set
    pub fn load_or_default(path: &Path) -> Result<Self, TrackerError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, TrackerError> {
        let file: CategoryFile = serde_json::from_str(contents)
            .map_err(|e| TrackerError::Config(format!("Invalid category JSON: {}", e)))?;
        Ok(file.into())
    }

    pub fn from_yaml(contents: &str) -> Result<Self, TrackerError> {
        let file: CategoryFile = serde_yaml::from_str(contents)
            .map_err(|e| TrackerError::Config(format!("Invalid category YAML: {}", e)))?;
        Ok(file.into())
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Category names in configuration order (without `Other`)
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Map a label to its configured spelling, case-insensitively.
    /// `Other` is always accepted.
    pub fn canonical(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(OTHER_CATEGORY) {
            return Some(OTHER_CATEGORY);
        }
        self.labels()
            .find(|name| name.to_lowercase() == label.to_lowercase())
    }

    /// Comma separated label list for prompts, `Other` last
    pub fn prompt_list(&self) -> String {
        let mut labels: Vec<&str> = self.labels().collect();
        if !labels.iter().any(|l| l.eq_ignore_ascii_case(OTHER_CATEGORY)) {
            labels.push(OTHER_CATEGORY);
        }
        labels.join(", ")
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::new(
                "Groceries",
                &["grocery", "groceries", "vegetable", "fruit", "milk", "supermarket", "bread", "eggs"],
            ),
            CategoryRule::new(
                "Food",
                &["food", "lunch", "dinner", "breakfast", "coffee", "chai", "restaurant", "snack", "pizza", "swiggy", "zomato"],
            ),
            CategoryRule::new(
                "Travel",
                &["flight", "train", "hotel", "trip", "travel", "ticket", "airbnb"],
            ),
            CategoryRule::new(
                "Transport",
                &["uber", "taxi", "cab", "bus fare", "metro", "fuel", "petrol", "diesel", "parking"],
            ),
            CategoryRule::new(
                "Utilities",
                &["electricity", "water bill", "gas bill", "internet", "wifi", "broadband", "recharge", "phone bill"],
            ),
            CategoryRule::new("Rent", &["rent", "lease", "maintenance"]),
            CategoryRule::new(
                "Shopping",
                &["amazon", "flipkart", "clothes", "shoes", "shirt", "shopping", "mall"],
            ),
            CategoryRule::new(
                "Entertainment",
                &["movie", "cinema", "concert", "netflix", "spotify", "game", "party"],
            ),
            CategoryRule::new(
                "Health",
                &["doctor", "medicine", "pharmacy", "hospital", "gym", "clinic"],
            ),
            CategoryRule::new(
                "Education",
                &["book", "course", "tuition", "school", "college", "udemy"],
            ),
            CategoryRule::new("Miscellaneous", &["gift", "donation", "misc"]),
        ])
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}: {}", rule.name, rule.keywords.join(", "))?;
        }
        Ok(())
    }
}

/// On-disk mapping, deserialized in document order
struct CategoryFile(Vec<(String, Vec<String>)>);

impl From<CategoryFile> for CategorySet {
    fn from(file: CategoryFile) -> Self {
        Self::new(
            file.0
                .into_iter()
                .map(|(name, keywords)| CategoryRule {
                    name: name.trim().to_string(),
                    keywords: keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
                })
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for CategoryFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = CategoryFile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of category name to keyword list")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, keywords)) = map.next_entry::<String, Vec<String>>()? {
                    entries.push((name, keywords));
                }
                Ok(CategoryFile(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}
