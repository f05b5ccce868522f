//! Canned profile document served from a stable URL.
//!
//! Used in offline mode so demos and tests don't spend enrichment credits.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::scrapin::get_json;
use super::ProfileSource;
use crate::config::EnrichmentConfig;
use crate::error::EnrichmentError;

pub struct FixtureSource {
    client: Client,
    fixture_url: String,
}

impl FixtureSource {
    pub fn new(config: &EnrichmentConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for the profile fixture")?;

        Ok(Self {
            client,
            fixture_url: config.fixture_url.clone(),
        })
    }
}

#[async_trait]
impl ProfileSource for FixtureSource {
    async fn fetch_profile(&self, profile_url: &str) -> Result<Value, EnrichmentError> {
        debug!("Offline mode: serving fixture {} for {profile_url}", self.fixture_url);
        get_json(self.client.get(&self.fixture_url)).await
    }

    fn source_name(&self) -> &str {
        "fixture"
    }
}
