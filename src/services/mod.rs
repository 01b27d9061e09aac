//! Service layer for the expense tracker
//!
//! The service layer sits between the chat/CLI surfaces and the ledger files:
//! classification, recording, extraction from free text, and month summaries.

pub mod classifier;
pub mod extraction;
pub mod recorder;
pub mod summary;

pub use classifier::{CategoryClassifier, DelegatedClassifier, KeywordClassifier};
pub use extraction::{ExpenseCandidate, ExtractionPipeline, ExtractionReport};
pub use recorder::LedgerWriter;
pub use summary::{CategoryTotal, MonthlySummary};
