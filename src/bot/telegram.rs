//! Telegram Bot API transport
//!
//! Long polling with `getUpdates`, replies with `sendMessage` and
//! `sendDocument`. Only text messages are surfaced; every other update is
//! acknowledged and skipped.
//!
//! Telegram only forgets an update once a later `getUpdates` call carries an
//! offset above its id. [`TelegramTransport::acknowledge`] makes that call
//! when a session ends, and [`TelegramTransport::offset`] lets the next
//! session carry on from the same point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::transport::{ChatTransport, InboundMessage};
use crate::config::settings::TelegramSettings;
use crate::error::{TrackerError, TrackerResult};

/// Extra time on top of the long-poll timeout before the HTTP client gives up
const POLL_MARGIN_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Bot API client holding the update offset
pub struct TelegramTransport {
    client: reqwest::Client,
    endpoint: String,
    poll_timeout: u64,
    offset: Option<i64>,
    /// Last offset the server has seen
    confirmed: Option<i64>,
}

impl TelegramTransport {
    pub fn new(token: &str, settings: &TelegramSettings) -> TrackerResult<Self> {
        if token.trim().is_empty() {
            return Err(TrackerError::Config("Telegram bot token is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.poll_timeout_secs + POLL_MARGIN_SECS))
            .build()
            .map_err(|e| TrackerError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", settings.api_base.trim_end_matches('/'), token.trim()),
            poll_timeout: settings.poll_timeout_secs,
            offset: None,
            confirmed: None,
        })
    }

    /// Continue from the offset an earlier session stopped at
    pub fn resume_from(mut self, offset: Option<i64>) -> Self {
        self.offset = offset;
        self
    }

    /// Offset of the next update to fetch
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    async fn get_updates(&self, timeout: u64, limit: Option<u32>) -> TrackerResult<Vec<Update>> {
        let mut params = json!({
            "timeout": timeout,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = self.offset {
            params["offset"] = json!(offset);
        }
        if let Some(limit) = limit {
            params["limit"] = json!(limit);
        }

        let request = self.client.post(self.method_url("getUpdates")).json(&params);
        self.call("getUpdates", request).await
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: reqwest::RequestBuilder) -> TrackerResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::Transport(format!("{} failed: {}", method, e.without_url())))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TrackerError::Transport(format!("{} returned invalid JSON: {}", method, e.without_url())))?;

        unwrap_response(method, body)
    }
}

fn unwrap_response<T>(method: &str, body: ApiResponse<T>) -> TrackerResult<T> {
    match (body.ok, body.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(TrackerError::Transport(format!(
            "{} rejected: {}",
            method,
            body.description.unwrap_or_else(|| "no description".into())
        ))),
    }
}

/// Text messages in `updates`, plus the offset acknowledging all of them
fn collect_messages(updates: Vec<Update>) -> (Vec<InboundMessage>, Option<i64>) {
    let next_offset = updates.iter().map(|u| u.update_id + 1).max();
    let messages = updates
        .into_iter()
        .filter_map(|update| update.message)
        .filter_map(|message| {
            let text = message.text?;
            Some(InboundMessage::new(message.chat.id, text))
        })
        .collect();
    (messages, next_offset)
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn receive(&mut self) -> TrackerResult<Vec<InboundMessage>> {
        let updates = self.get_updates(self.poll_timeout, None).await?;
        self.confirmed = self.offset;

        let (messages, next_offset) = collect_messages(updates);
        if next_offset.is_some() {
            self.offset = next_offset;
        }
        Ok(messages)
    }

    async fn reply_text(&self, chat_id: i64, text: &str) -> TrackerResult<()> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }));
        self.call::<serde_json::Value>("sendMessage", request).await?;
        debug!(chat_id, "sent text reply");
        Ok(())
    }

    async fn reply_document(&self, chat_id: i64, bytes: Vec<u8>, filename: &str) -> TrackerResult<()> {
        let document = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .map_err(|e| TrackerError::Transport(format!("Invalid document part: {}", e)))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", document);

        let request = self.client.post(self.method_url("sendDocument")).multipart(form);
        self.call::<serde_json::Value>("sendDocument", request).await?;
        debug!(chat_id, filename, "sent document");
        Ok(())
    }

    async fn acknowledge(&mut self) -> TrackerResult<()> {
        if self.offset.is_none() || self.offset == self.confirmed {
            return Ok(());
        }

        // Anything this returns sits at or above the offset and stays queued
        self.get_updates(0, Some(1)).await?;
        self.confirmed = self.offset;
        debug!(offset = ?self.offset, "acknowledged updates");
        Ok(())
    }
}
