//! Prompt templates

use crate::config::CategorySet;

const EXTRACTION_TEMPLATE: &str = r#"You are a strict JSON extractor.

Given this text: '{text}', extract all expenses and their numeric amounts.

Return ONLY valid JSON in this format:
[
  {"description": "...", "amount": ..., "category": "..."},
  {"description": "...", "amount": ..., "category": "..."}
]

Rules:
- "category" must be one of: {categories}.
- "amount" must be a plain number.
- Return nothing but valid JSON.
- Do not include currency names, symbols, or extra text.
- No markdown.
- If the text mentions no expenses, return []."#;

const CLASSIFICATION_TEMPLATE: &str = r#"You are an expense classifier.

Classify this expense: '{description}'

Pick exactly one category from: {categories}.

Respond with a single JSON object and nothing else:
{"category": "<one of the categories>"}"#;

/// Prompt asking for a JSON array of expenses found in `text`
pub fn extraction_prompt(text: &str, categories: &CategorySet) -> String {
    EXTRACTION_TEMPLATE
        .replace("{categories}", &categories.prompt_list())
        .replace("{text}", text.trim())
}

/// Prompt asking for the category of one description
pub fn classification_prompt(description: &str, categories: &CategorySet) -> String {
    CLASSIFICATION_TEMPLATE
        .replace("{categories}", &categories.prompt_list())
        .replace("{description}", description.trim())
}
