//! Path management for the expense tracker
//!
//! ## Path Resolution Order
//!
//! 1. `EXPENSE_TRACKER_HOME` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (`~/.config/expense-tracker` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::TrackerError;

/// Environment variable that overrides the base directory
pub const HOME_ENV_VAR: &str = "EXPENSE_TRACKER_HOME";

/// Manages all paths used by the expense tracker
#[derive(Debug, Clone)]
pub struct TrackerPaths {
    /// Base directory for settings, categories and ledgers
    base_dir: PathBuf,
}

impl TrackerPaths {
    /// Create a new TrackerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, TrackerError> {
        let base_dir = if let Ok(custom) = std::env::var(HOME_ENV_VAR) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "expense-tracker")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    TrackerError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create TrackerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the default path of the category keyword file
    pub fn categories_file(&self) -> PathBuf {
        self.base_dir.join("categories.json")
    }

    /// Get the default directory holding the monthly ledgers
    pub fn ledger_dir(&self) -> PathBuf {
        self.base_dir.join("ledgers")
    }

    /// Ensure the base and ledger directories exist
    pub fn ensure_directories(&self) -> Result<(), TrackerError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TrackerError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.ledger_dir())
            .map_err(|e| TrackerError::Io(format!("Failed to create ledger directory: {}", e)))?;

        Ok(())
    }
}
