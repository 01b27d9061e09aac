//! Chat Expense Tracker - free-text expenses into a monthly ledger
//!
//! Messages sent to a chat bot are handed to a language model that extracts
//! `{description, amount, category}` records. Each record is appended to the
//! CSV ledger of its month, which the user can download from the chat.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, settings and the category keyword file
//! - `error`: Custom error types
//! - `models`: Expense records and month keys
//! - `storage`: Monthly ledger files
//! - `llm`: Language model client, prompts and JSON isolation
//! - `services`: Classification, recording, extraction, summaries
//! - `bot`: Chat transport, handlers and the session loop
//! - `supervisor`: Active-hours scheduling and crash restarts
//! - `display`: Terminal tables for the CLI
//! - `logging`: Tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_expense_tracker::config::{CategorySet, Settings, TrackerPaths};
//!
//! let paths = TrackerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let categories = CategorySet::load_or_default(&settings.categories_file(&paths))?;
//! ```

pub mod bot;
pub mod config;
pub mod display;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod supervisor;

pub use error::{TrackerError, TrackerResult};
