//! Chat transport boundary

use async_trait::async_trait;

use crate::error::TrackerResult;

/// A text message from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

impl InboundMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
        }
    }
}

/// Delivers inbound messages and sends replies
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Next batch of inbound messages; may be empty after a poll timeout
    async fn receive(&mut self) -> TrackerResult<Vec<InboundMessage>>;

    async fn reply_text(&self, chat_id: i64, text: &str) -> TrackerResult<()>;

    async fn reply_document(&self, chat_id: i64, bytes: Vec<u8>, filename: &str)
        -> TrackerResult<()>;

    /// Confirm every message received so far with the chat service, so a
    /// later session is not handed them again
    async fn acknowledge(&mut self) -> TrackerResult<()> {
        Ok(())
    }
}
