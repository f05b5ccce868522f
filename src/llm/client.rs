//! `LlmClient` trait: abstraction over LLM backends.
//!
//! Providers (Ollama, Anthropic) implement this trait so the pipeline
//! can be configured to use any supported backend via the
//! `[llm] provider` config field.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single chat turn.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// LLM response with metadata
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Abstraction over LLM backends.
///
/// Each provider translates the shared message type into its own
/// wire format and normalizes responses back into [`LlmResponse`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends a conversation to the LLM and returns the response.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<LlmResponse>;

    /// Human-readable description of the provider and model.
    ///
    /// Used in log output, e.g. `"ollama (llama3.2:3b)"`.
    fn description(&self) -> String;
}
