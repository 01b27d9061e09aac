use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LanguageModel;
use crate::config::settings::LlmSettings;
use crate::error::{TrackerError, TrackerResult};

/// Client for an Ollama-compatible `/api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(settings: &LlmSettings, api_key: Option<String>) -> TrackerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| TrackerError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> TrackerResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TrackerError::Llm(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Llm(format!("API error {}: {}", status, body)));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TrackerError::Llm(format!("Failed to decode model response: {}", e)))?;

        debug!(model = %self.model, response = %reply.response, "raw model response");
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalises_base_url_and_key() {
        let settings = LlmSettings {
            base_url: "http://localhost:11434/".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 5,
        };

        let client = OllamaClient::new(&settings, Some("  ".to_string())).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "llama3");
        assert!(client.api_key.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_llm_error() {
        let settings = LlmSettings {
            // Port 9 (discard) on localhost refuses connections
            base_url: "http://127.0.0.1:9".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 2,
        };
        let client = OllamaClient::new(&settings, None).unwrap();

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, TrackerError::Llm(_)));
    }
}
