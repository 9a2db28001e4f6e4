use crate::types::{MonitorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Text-generation collaborator used by the summarizer's primary path.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_name(&self) -> String;

    /// Generate a condensed rendition of `text` between `min_len` and
    /// `max_len` characters. Failures and timeouts surface as `Err` so the
    /// caller can fall back.
    async fn generate(&self, text: &str, max_len: usize, min_len: usize) -> Result<String>;
}

/// Chat-completions backed model client. Calls are bounded by the client
/// timeout; the summarizer treats every failure as a signal to fall back.
pub struct HttpTextModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpTextModel {
    pub fn new(endpoint: String, model: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint,
            model,
            api_key,
        }
    }
}

#[async_trait]
impl TextModel for HttpTextModel {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    async fn generate(&self, text: &str, max_len: usize, min_len: usize) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MonitorError::Model("no API key configured".to_string()))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You summarize corporate generative-AI news. \
                                Reply with only the summary text."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Summarize the following article in roughly {} to {} characters:\n\n{}",
                        min_len, max_len, text
                    )
                }
            ],
            "max_tokens": 200,
            "temperature": 0.3
        });

        debug!("Requesting summary from {} via {}", self.model, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MonitorError::Model(format!(
                "model endpoint returned HTTP {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        let summary = payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MonitorError::Model("malformed model response".to_string()))?;

        Ok(summary)
    }
}

/// Canned model for tests: either replies with a fixed string or always
/// fails to exercise the extractive fallback.
pub struct MockTextModel {
    reply: Option<String>,
}

impl MockTextModel {
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl TextModel for MockTextModel {
    fn model_name(&self) -> String {
        "mock".to_string()
    }

    async fn generate(&self, _text: &str, _max_len: usize, _min_len: usize) -> Result<String> {
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(MonitorError::Model("mock model unavailable".to_string())),
        }
    }
}
