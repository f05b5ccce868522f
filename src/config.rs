use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// "ollama" or "anthropic"
    pub provider: String,
    pub model: String,
    /// Supports ${ENV_VAR} substitution. Unused by Ollama.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens_per_request: u32,
    /// Ollama base URL, defaults to http://localhost:11434
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Ask the backend for a JSON-only answer when it supports it
    #[serde(default = "default_true")]
    pub json_mode: bool,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: String,
    /// Supports ${ENV_VAR} substitution
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: u8,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enrichment_endpoint")]
    pub endpoint: String,
    /// Supports ${ENV_VAR} substitution
    #[serde(default)]
    pub api_key: String,
    /// Serve the canned fixture instead of calling the live API
    #[serde(default)]
    pub offline: bool,
    #[serde(default = "default_fixture_url")]
    pub fixture_url: String,
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub on_failure: EnrichmentFailurePolicy,
}

/// What the pipeline does when the enrichment provider fails.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentFailurePolicy {
    /// Surface the enrichment error to the caller
    #[default]
    Abort,
    /// Build a minimal profile from the URL slug and keep going
    Synthesize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverConfig {
    /// Platform name used in the "<name> <platform> profile" query
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Target of the site-restricted query, e.g. "linkedin.com/in"
    #[serde(default = "default_site")]
    pub site: String,
    /// Path segment that introduces a personal profile slug
    #[serde(default = "default_profile_segment")]
    pub profile_segment: String,
    /// Only accept profile URLs whose host ends with this domain
    #[serde(default)]
    pub profile_host: Option<String>,
    /// Try the enrichment API for a real photo of each candidate
    #[serde(default = "default_true")]
    pub fetch_pictures: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SummaryConfig {
    /// Custom prompt template with {profile} and {format_instructions}
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_true() -> bool {
    true
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_search_provider() -> String {
    "tavily".to_string()
}

fn default_max_results() -> u8 {
    5
}

fn default_search_timeout() -> u64 {
    30
}

fn default_enrichment_endpoint() -> String {
    "https://api.scrapin.io/enrichment/profile".to_string()
}

fn default_fixture_url() -> String {
    "https://gist.githubusercontent.com/tankudo/e5cc6dd09b392353ec2920e3072f8552/raw/tatyjana-ankudo-scraping.json".to_string()
}

fn default_enrichment_timeout() -> u64 {
    10
}

fn default_platform() -> String {
    "LinkedIn".to_string()
}

fn default_site() -> String {
    "linkedin.com/in".to_string()
}

fn default_profile_segment() -> String {
    "in".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_key: String::new(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_enrichment_endpoint(),
            api_key: String::new(),
            offline: false,
            fixture_url: default_fixture_url(),
            timeout_secs: default_enrichment_timeout(),
            on_failure: EnrichmentFailurePolicy::default(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            site: default_site(),
            profile_segment: default_profile_segment(),
            profile_host: None,
            fetch_pictures: true,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        // Expand environment variables like ${TAVILY_API_KEY}
        let expanded = shellexpand::env(&content)?;
        Self::parse(&expanded)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
