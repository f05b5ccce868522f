//! Secondary resolution strategy for names the resolver found nothing for.
//!
//! One site-restricted search, then the LLM is asked to pick the single
//! most likely profile URL from the results. When its answer holds no
//! profile URL, the search results themselves are scanned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::profile_slug;
use crate::config::ResolverConfig;
use crate::llm::{LlmClient, Message};
use crate::search::{self, SearchProvider, SearchResult};

const SYSTEM_PROMPT: &str = "You find professional profile pages. \
     Answer with a single URL and nothing else.";

pub struct SingleUrlFinder {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmClient>,
    config: ResolverConfig,
}

impl SingleUrlFinder {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmClient>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            search,
            llm,
            config,
        }
    }

    /// The single most likely profile URL for `name`, if any.
    pub async fn find(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let query = format!("{name} site:{}", self.config.site);
        let results = match self.search.search(&query).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Fallback search for '{name}' failed: {e}");
                return None;
            }
        };

        let prompt = format!(
            "Given the full name {name}, give me the link to their {} profile page. \
             Your answer should contain only a URL.\n\n{}",
            self.config.platform,
            search::format_results(&query, &results)
        );

        match self.llm.complete(SYSTEM_PROMPT, &[Message::user(prompt)]).await {
            Ok(response) => {
                debug!("Fallback LLM answer: {}", response.text.trim());
                if let Some(url) = extract_profile_url(&response.text, &self.config) {
                    info!("Fallback resolved '{name}' to {url}");
                    return Some(url);
                }
            }
            Err(e) => warn!("Fallback LLM call failed: {e:#}"),
        }

        let url = scan_results(&results, &self.config);
        match url {
            Some(ref url) => info!("Fallback found {url} in search results for '{name}'"),
            None => info!("Fallback found no profile URL for '{name}'"),
        }
        url
    }
}

/// First profile URL mentioned anywhere in `text`, without trailing slash.
pub fn extract_profile_url(text: &str, config: &ResolverConfig) -> Option<String> {
    text.split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '(' | ')' | '[' | ']' | '`'))
        .map(|token| token.trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter(|token| token.starts_with("http://") || token.starts_with("https://"))
        .find(|token| profile_slug(token, config).is_some())
        .map(|url| url.trim_end_matches('/').to_string())
}

/// Looks for a profile URL in result URLs first, then in their text.
fn scan_results(results: &[SearchResult], config: &ResolverConfig) -> Option<String> {
    results
        .iter()
        .find(|r| profile_slug(&r.url, config).is_some())
        .map(|r| r.url.trim_end_matches('/').to_string())
        .or_else(|| {
            results.iter().find_map(|r| {
                extract_profile_url(&r.title, config)
                    .or_else(|| extract_profile_url(&r.snippet, config))
            })
        })
}
