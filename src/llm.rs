//! Chat-completions client for the summarisation and judgment calls.
//!
//! Speaks the non-streaming OpenAI-compatible `/v1/chat/completions` route,
//! which Ollama, llama.cpp and vLLM all serve.
//!
//! ```no_run
//! # async fn example() -> industry_scout::Result<()> {
//! use industry_scout::llm::ChatClient;
//!
//! let client = ChatClient::new("llama3:instruct")
//!     .with_base_url("http://127.0.0.1:11434")
//!     .build()?;
//! let reply = client.complete("Say hello").await?;
//! # Ok(())
//! # }
//! ```

use crate::config::LlmConfig;
use crate::error::{Result, ScoutError};
use crate::prompts;
use crate::services::{Judge, Summarize};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Builder for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatClientBuilder {
    base_url: String,
    model: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl ChatClientBuilder {
    /// Set the server base URL (without `/v1`).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<ChatClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ScoutError::Config(format!("failed to build LLM HTTP client: {e}")))?;
        Ok(ChatClient {
            endpoint: format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/')),
            model: self.model,
            temperature: self.temperature,
            http,
        })
    }
}

/// Non-streaming chat-completions client.
#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: String,
    model: String,
    temperature: Option<f32>,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatClient {
    /// Start building a client for `model` against the local Ollama default.
    pub fn new(model: impl Into<String>) -> ChatClientBuilder {
        let defaults = LlmConfig::default();
        ChatClientBuilder {
            base_url: defaults.base_url,
            model: model.into(),
            timeout: Duration::from_secs(defaults.timeout_seconds),
            temperature: None,
        }
    }

    /// Build a client from the `[llm]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut builder = Self::new(config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(temperature) = config.temperature {
            builder = builder.with_temperature(temperature);
        }
        builder.build()
    }

    /// The completions URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one user message and return the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Llm`] on transport failure, a non-success
    /// status, or a response without non-empty message content.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            temperature: self.temperature,
        };
        tracing::trace!(model = %self.model, prompt, "LLM request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScoutError::Llm(format!("LLM request timed out: {e}"))
                } else {
                    ScoutError::Llm(format!("LLM request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScoutError::Llm(format!(
                "LLM HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&text)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Llm(format!("malformed LLM response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ScoutError::Llm("LLM response has no message content".into()))?;

        tracing::trace!(reply = %content, "LLM response");
        Ok(content)
    }
}

/// Extract `error.message` (OpenAI) or `error` (Ollama) from an error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl Summarize for ChatClient {
    async fn summarize(&self, content: &str, industry: &str) -> Result<String> {
        self.complete(&prompts::summary_prompt(content, industry)).await
    }
}

#[async_trait]
impl Judge for ChatClient {
    async fn judge(&self, summary: &str, industry: &str, template: &str) -> Result<String> {
        self.complete(&prompts::judgment_prompt(summary, industry, template))
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let client = ChatClient::new("m")
            .with_base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn from_config_uses_defaults() {
        let client = ChatClient::from_config(&LlmConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:11434/v1/chat/completions");
        assert_eq!(client.model, "llama3:instruct");
        assert!(client.temperature.is_none());
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "llama3:instruct",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
            temperature: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama3:instruct",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"model not found"}}"#),
            "model not found"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"model 'x' not found"}"#),
            "model 'x' not found"
        );
        assert_eq!(extract_error_message("plain"), "plain");
    }
}
