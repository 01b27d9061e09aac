//! Configuration module for the expense tracker
//!
//! This module provides configuration management including:
//! - Base directory resolution
//! - User settings persistence
//! - The category keyword file

pub mod categories;
pub mod paths;
pub mod settings;

pub use categories::{CategoryRule, CategorySet, OTHER_CATEGORY};
pub use paths::TrackerPaths;
pub use settings::{ClassifierStrategy, Settings};
