//! User settings for the expense tracker
//!
//! Manages the classifier strategy, language model endpoint, active hours and
//! the chat transport tuning. Every field has a default so a partial
//! `config.json` is enough.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::TrackerPaths;
use crate::error::TrackerError;
use crate::supervisor::ActiveWindow;

/// Which category classifier to run when the model omits a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    /// Keyword matching against the category file (default)
    #[default]
    Keyword,
    /// Ask the language model
    Delegated,
}

/// Language model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the Ollama-compatible server
    pub base_url: String,
    /// Model name passed with every request
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Time-of-day window during which the bot runs (local time, `HH:MM`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveHours {
    pub start: String,
    pub end: String,
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self {
            start: "10:00".to_string(),
            end: "00:00".to_string(),
        }
    }
}

/// Supervisor delays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorSettings {
    /// Pause after the chat session crashed
    pub crash_cooldown_secs: u64,
    /// Pause between checks outside active hours
    pub idle_sleep_secs: u64,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            crash_cooldown_secs: 60,
            idle_sleep_secs: 600,
        }
    }
}

/// Telegram Bot API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub api_base: String,
    /// Long polling timeout for `getUpdates`
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

/// User settings for the expense tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub classifier: ClassifierStrategy,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub active_hours: ActiveHours,

    #[serde(default)]
    pub supervisor: SupervisorSettings,

    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Currency symbol used in chat replies
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Override for the ledger directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_dir: Option<PathBuf>,

    /// Override for the category keyword file (JSON or YAML)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories_file: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            classifier: ClassifierStrategy::default(),
            llm: LlmSettings::default(),
            active_hours: ActiveHours::default(),
            supervisor: SupervisorSettings::default(),
            telegram: TelegramSettings::default(),
            currency_symbol: default_currency(),
            ledger_dir: None,
            categories_file: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, or use the defaults if the file doesn't exist
    pub fn load_or_create(paths: &TrackerPaths) -> Result<Self, TrackerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                TrackerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TrackerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackerPaths) -> Result<(), TrackerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            TrackerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            TrackerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Ledger directory, honouring the override
    pub fn ledger_dir(&self, paths: &TrackerPaths) -> PathBuf {
        self.ledger_dir.clone().unwrap_or_else(|| paths.ledger_dir())
    }

    /// Category file, honouring the override
    pub fn categories_file(&self, paths: &TrackerPaths) -> PathBuf {
        self.categories_file
            .clone()
            .unwrap_or_else(|| paths.categories_file())
    }

    /// Parse the configured active hours
    pub fn active_window(&self) -> Result<ActiveWindow, TrackerError> {
        ActiveWindow::parse(&self.active_hours.start, &self.active_hours.end)
    }

    pub fn crash_cooldown(&self) -> Duration {
        Duration::from_secs(self.supervisor.crash_cooldown_secs)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_secs(self.supervisor.idle_sleep_secs)
    }
}
