//! Scrapin enrichment API.
//!
//! Calls `GET {endpoint}?apikey=…&linkedInUrl=…`. A successful answer
//! carries the profile under a top-level `person` object.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::ProfileSource;
use crate::config::EnrichmentConfig;
use crate::error::EnrichmentError;

pub struct ScrapinSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ScrapinSource {
    pub fn new(config: &EnrichmentConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for enrichment")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

/// Sends `request` and decodes a JSON body, mapping failures to [`EnrichmentError`].
pub(super) async fn get_json(request: reqwest::RequestBuilder) -> Result<Value, EnrichmentError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(EnrichmentError::Status { status, body });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| EnrichmentError::Malformed(e.to_string()))
}

#[async_trait]
impl ProfileSource for ScrapinSource {
    async fn fetch_profile(&self, profile_url: &str) -> Result<Value, EnrichmentError> {
        if self.api_key.is_empty() {
            return Err(EnrichmentError::MissingApiKey);
        }

        let request = self.client.get(&self.endpoint).query(&[
            ("apikey", self.api_key.as_str()),
            ("linkedInUrl", profile_url),
        ]);

        get_json(request).await
    }

    fn source_name(&self) -> &str {
        "scrapin"
    }
}
