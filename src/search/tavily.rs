//! Tavily Search API provider.
//!
//! Calls `POST https://api.tavily.com/search` with the API key in
//! the request body.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SearchProvider, SearchResult};
use crate::config::SearchConfig;
use crate::error::SearchError;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

// ── Tavily API types ─────────────────────────────────────

/// Tavily Search API request body.
#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u8,
    include_answer: bool,
}

/// Tavily Search API response.
#[derive(Deserialize)]
struct TavilyApiResponse {
    #[serde(default)]
    results: Vec<TavilyApiResult>,
}

/// A single result from the Tavily API.
#[derive(Deserialize)]
struct TavilyApiResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

impl From<TavilyApiResult> for SearchResult {
    fn from(r: TavilyApiResult) -> Self {
        SearchResult {
            url: r.url,
            title: r.title,
            snippet: r.content,
        }
    }
}

/// Decodes a Tavily response body into normalized results.
fn parse_response(body: &str) -> Result<Vec<SearchResult>, SearchError> {
    let tavily: TavilyApiResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))?;
    Ok(tavily.results.into_iter().map(SearchResult::from).collect())
}

// ── TavilyProvider ───────────────────────────────────────

pub struct TavilyProvider {
    client: Client,
    api_key: String,
    max_results: u8,
}

impl TavilyProvider {
    pub fn new(config: &SearchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for Tavily")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            include_answer: false,
        };

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let body = response.text().await?;
        parse_response(&body)
    }

    fn provider_name(&self) -> &str {
        "tavily"
    }
}
