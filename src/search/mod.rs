//! Web search providers.
//!
//! The candidate resolver and the single-URL finder use a search
//! provider to surface profile pages for a person's name.
//!
//! Supported providers:
//! - **Tavily**: dedicated search API with structured results

mod tavily;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::SearchError;

pub use tavily::TavilyProvider;

/// A single search result, normalized across all providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Abstraction over web search backends.
///
/// Each provider implements this trait to normalize its API response
/// into a list of [`SearchResult`]s.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search and return normalized results, best first.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;

    /// The provider name (e.g. `"tavily"`).
    fn provider_name(&self) -> &str;
}

/// Builds the search backend named by `[search] provider`.
pub fn from_config(config: &SearchConfig) -> anyhow::Result<Arc<dyn SearchProvider>> {
    match config.provider.as_str() {
        "tavily" => {
            if config.api_key.is_empty() {
                anyhow::bail!("[search] api_key is required for the tavily provider");
            }
            Ok(Arc::new(TavilyProvider::new(config)?))
        }
        other => anyhow::bail!("Unsupported web search provider: '{other}'. Supported: 'tavily'."),
    }
}

/// Formats search results into an LLM-friendly string.
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut output = format!("Web search results for: {query}\n");

    if results.is_empty() {
        output.push_str("\nNo results found.");
        return output;
    }

    output.push_str(&format!("\n{} results:\n", results.len()));

    for (i, result) in results.iter().enumerate() {
        output.push_str(&format!(
            "\n{}. {}\n   {}\n   {}\n",
            i + 1,
            result.title,
            result.url,
            result.snippet,
        ));
    }

    output
}
