pub mod anthropic;
pub mod client;
pub mod ollama;

use std::sync::Arc;

use anyhow::Result;

use crate::config::LlmConfig;

pub use anthropic::AnthropicClient;
pub use client::{LlmClient, LlmResponse, Message};
pub use ollama::OllamaClient;

/// Builds the LLM backend named by `[llm] provider`.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaClient::new(config.clone())?)),
        "anthropic" => {
            if config.api_key.is_empty() {
                anyhow::bail!("[llm] api_key is required for the anthropic provider");
            }
            Ok(Arc::new(AnthropicClient::new(config.clone())?))
        }
        other => anyhow::bail!(
            "Unsupported LLM provider: '{other}'. Supported: 'ollama', 'anthropic'."
        ),
    }
}
