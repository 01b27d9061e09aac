//! Custom error types for the expense tracker
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for expense tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// The category classifier could not produce a label
    #[error("Classification error: {0}")]
    Classification(String),

    /// The model response held no usable expenses
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Ledger file could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Language model request failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Chat transport failures
    #[error("Transport error: {0}")]
    Transport(String),
}

impl TrackerError {
    /// Create an extraction error
    pub fn extraction(reason: impl Into<String>) -> Self {
        Self::Extraction(reason.into())
    }

    /// Create a storage error for a path
    pub fn storage(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", path.display(), reason))
    }

    /// Check if this is an extraction error
    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }

    /// Whether the failure was caused by what the user sent rather than by
    /// the system (model unreachable, disk full, ...)
    pub fn is_user_caused(&self) -> bool {
        self.is_extraction()
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for expense tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
