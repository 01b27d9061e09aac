//! Message handlers
//!
//! Every inbound message maps to exactly one [`Reply`]. Failures are turned
//! into user-facing text here; raw error text only goes to the log.

use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use super::transport::InboundMessage;
use crate::models::MonthKey;
use crate::services::{ExtractionPipeline, MonthlySummary};
use crate::storage::{ledger_file_name, LedgerStore};

pub const GREETING: &str =
    "👋 Hi! Send me your expense in plain text and I'll categorize and log it for you.";

pub const HELP: &str = "Send expenses in plain text, e.g. \"coffee 50 and taxi 200\".\n\n\
Commands:\n\
/download - get this month's ledger file\n\
/summary - totals per category for this month\n\
/help - show this message";

pub const NOTHING_FOUND: &str = "I didn't find any expenses in that message.";

pub const EXTRACTION_FAILED: &str =
    "❌ I couldn't detect valid expenses. Please try again with a clearer format.";

pub const INTERNAL_FAILURE: &str =
    "⚠️ Something went wrong on my side while saving your expenses. Please try again later.";

pub const NO_LEDGER_YET: &str = "No expenses recorded yet this month.";

/// What to send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Document { bytes: Vec<u8>, filename: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Bot commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Download,
    Summary,
    Help,
    Unknown(String),
}

impl Command {
    /// Parse `/name` or `/name@botname`, ignoring arguments. Returns `None`
    /// for plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        Some(match name.as_str() {
            "start" => Self::Start,
            "download" => Self::Download,
            "summary" => Self::Summary,
            "help" => Self::Help,
            _ => Self::Unknown(name),
        })
    }
}

/// Routes messages to the pipeline and the ledger store
#[derive(Clone)]
pub struct Handlers {
    pipeline: ExtractionPipeline,
    store: LedgerStore,
    currency: String,
}

impl Handlers {
    pub fn new(pipeline: ExtractionPipeline, currency: impl Into<String>) -> Self {
        let store = pipeline.writer().store().clone();
        Self {
            pipeline,
            store,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self, message: &InboundMessage) -> Reply {
        self.handle_on(Local::now().date_naive(), message).await
    }

    /// Handle a message as if today were `today`
    pub async fn handle_on(&self, today: NaiveDate, message: &InboundMessage) -> Reply {
        match Command::parse(&message.text) {
            Some(Command::Start) => Reply::text(GREETING),
            Some(Command::Help) => Reply::text(HELP),
            Some(Command::Unknown(name)) => {
                info!(chat_id = message.chat_id, command = %name, "unknown command");
                Reply::text(HELP)
            }
            Some(Command::Download) => self.download(MonthKey::from_date(today)),
            Some(Command::Summary) => self.summary(MonthKey::from_date(today)),
            None => self.expenses(today, message).await,
        }
    }

    async fn expenses(&self, today: NaiveDate, message: &InboundMessage) -> Reply {
        match self.pipeline.process_on(today, &message.text).await {
            Ok(report) if report.is_empty() => Reply::text(NOTHING_FOUND),
            Ok(report) => Reply::Text(format!(
                "Expenses recorded:\n{}",
                report.summary(&self.currency)
            )),
            Err(e) if e.is_user_caused() => {
                warn!(chat_id = message.chat_id, error = %e, "could not extract expenses");
                Reply::text(EXTRACTION_FAILED)
            }
            Err(e) => {
                error!(chat_id = message.chat_id, error = %e, "failed to record expenses");
                Reply::text(INTERNAL_FAILURE)
            }
        }
    }

    fn download(&self, month: MonthKey) -> Reply {
        match self.store.read_bytes(month) {
            Ok(Some(bytes)) => Reply::Document {
                bytes,
                filename: ledger_file_name(month),
            },
            Ok(None) => Reply::text(NO_LEDGER_YET),
            Err(e) => {
                error!(month = %month, error = %e, "failed to read ledger");
                Reply::text(INTERNAL_FAILURE)
            }
        }
    }

    fn summary(&self, month: MonthKey) -> Reply {
        match MonthlySummary::load(&self.store, month) {
            Ok(summary) if summary.is_empty() => Reply::text(NO_LEDGER_YET),
            Ok(summary) => Reply::Text(summary.to_message(&self.currency)),
            Err(e) => {
                error!(month = %month, error = %e, "failed to summarise ledger");
                Reply::text(INTERNAL_FAILURE)
            }
        }
    }
}
