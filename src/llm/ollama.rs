//! Ollama API provider.
//!
//! Calls `POST {host}/api/chat` with an Ollama-native request format
//! and normalizes the response into `LlmResponse`.
//!
//! Key differences from Anthropic:
//! - System prompt is sent as a `role: "system"` message (not a top-level field).
//! - JSON-only output is requested with `format: "json"`.
//! - Token usage: `prompt_eval_count` / `eval_count` (may be absent).
//! - Must set `stream: false` for synchronous responses.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::client::{LlmClient, LlmResponse, Message};
use crate::config::LlmConfig;

/// Default Ollama API base URL.
const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

// ── Ollama API request types ─────────────────────────────

/// Ollama `/api/chat` request body.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    options: OllamaOptions,
}

/// Ollama generation options.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

// ── Ollama API response types ────────────────────────────

/// Ollama `/api/chat` response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Message in an Ollama response.
#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

// ── OllamaClient ────────────────────────────────────────

/// Client for the Ollama API.
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
    host: String,
}

impl OllamaClient {
    /// Creates a new Ollama client from configuration.
    ///
    /// If `config.host` is `None`, defaults to `http://localhost:11434`.
    pub fn new(config: LlmConfig) -> Result<Self> {
        let host = config
            .host
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());
        // Strip trailing slash for consistent URL construction
        let host = host.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for Ollama")?;
        Ok(Self {
            client,
            config,
            host,
        })
    }

    fn build_request(&self, system_prompt: &str, messages: &[Message]) -> OllamaChatRequest {
        let mut ollama_messages = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            ollama_messages.push(Message {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            });
        }
        ollama_messages.extend_from_slice(messages);

        OllamaChatRequest {
            model: self.config.model.clone(),
            messages: ollama_messages,
            stream: false,
            format: self.config.json_mode.then(|| "json".to_string()),
            options: OllamaOptions {
                num_predict: self.config.max_tokens_per_request,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<LlmResponse> {
        let request = self.build_request(system_prompt, messages);
        let url = format!("{}/api/chat", self.host);

        debug!(
            "Calling Ollama API ({}) with {} messages{}",
            self.config.model,
            messages.len(),
            if request.format.is_some() { " (json)" } else { "" }
        );

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error ({status}): {body}");
        }

        let resp: OllamaChatResponse = response.json().await?;

        let input_tokens = resp.prompt_eval_count.unwrap_or(0);
        let output_tokens = resp.eval_count.unwrap_or(0);

        info!("LLM response: {input_tokens} in / {output_tokens} out tokens");

        Ok(LlmResponse {
            text: resp.message.content,
            input_tokens,
            output_tokens,
        })
    }

    fn description(&self) -> String {
        format!("{} ({})", self.config.provider, self.config.model)
    }
}
