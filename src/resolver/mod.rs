//! Candidate resolution: free-text name → deduplicated profile candidates.
//!
//! Several query variants are sent to the search provider, one after the
//! other. Each trades recall for precision differently; results that do
//! not look like a personal profile page are dropped, and the first
//! variant to surface a URL wins.

mod fallback;
pub mod picture;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::ResolverConfig;
use crate::enrichment::ProfileEnricher;
use crate::profile::{EnrichedProfile, ProfileCandidate};
use crate::search::SearchProvider;

pub use fallback::SingleUrlFinder;
use picture::Placeholder;

/// Conventional separator between a person's name and role in page titles.
const TITLE_SEPARATOR: &str = " - ";

/// Maximum preview length in characters, before the ellipsis.
const PREVIEW_CHARS: usize = 100;

pub struct CandidateResolver {
    search: Arc<dyn SearchProvider>,
    enricher: Arc<ProfileEnricher>,
    config: ResolverConfig,
    offline: bool,
}

impl CandidateResolver {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        enricher: Arc<ProfileEnricher>,
        config: ResolverConfig,
        offline: bool,
    ) -> Self {
        Self {
            search,
            enricher,
            config,
            offline,
        }
    }

    /// Query variants, in the order they are searched.
    pub fn query_variants(&self, name: &str) -> Vec<String> {
        let bare = name.trim();
        vec![
            bare.to_string(),
            format!("{bare} {} profile", self.config.platform),
            format!("\"{bare}\" site:{}", self.config.site),
            name.to_string(),
        ]
    }

    /// Searches every query variant and returns the profile candidates found,
    /// with pictures when `fetch_pictures` is enabled.
    ///
    /// Never fails: a failing variant is skipped, total failure is an
    /// empty list.
    pub async fn resolve_candidates(&self, name: &str) -> Vec<ProfileCandidate> {
        let mut candidates = self.search_candidates(name).await;
        self.attach_pictures(&mut candidates).await;
        candidates
    }

    /// Like [`resolve_candidates`](Self::resolve_candidates) but without any
    /// enrichment call: every candidate carries its placeholder picture.
    pub async fn search_candidates(&self, name: &str) -> Vec<ProfileCandidate> {
        if name.trim().is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for query in self.query_variants(name) {
            let results = match self.search.search(&query).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Search for '{query}' failed, skipping: {e}");
                    continue;
                }
            };
            debug!("Search '{query}': {} results", results.len());

            for result in results {
                let Some(slug) = profile_slug(&result.url, &self.config) else {
                    continue;
                };
                if !seen.insert(result.url.clone()) {
                    continue;
                }

                let (display_name, preview) = split_title(&result.title, &result.snippet, &slug);
                let placeholder = Placeholder::for_name(&display_name);

                candidates.push(ProfileCandidate {
                    url: result.url,
                    display_name,
                    preview,
                    picture_url: Some(placeholder.url()),
                    picture_is_placeholder: true,
                });
            }
        }

        info!("Resolved {} candidate(s) for '{}'", candidates.len(), name.trim());
        candidates
    }

    /// Replaces placeholders with real photos where the enrichment provider
    /// has one. Returns the profiles fetched on the way, keyed by URL.
    ///
    /// Does nothing when `fetch_pictures` is disabled.
    pub async fn attach_pictures(
        &self,
        candidates: &mut [ProfileCandidate],
    ) -> HashMap<String, EnrichedProfile> {
        let mut fetched = HashMap::new();
        if !self.config.fetch_pictures {
            return fetched;
        }

        for candidate in candidates.iter_mut() {
            let profile = match self.enricher.enrich(&candidate.url, self.offline).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    debug!("Picture lookup for {} failed: {e}", candidate.url);
                    None
                }
            };

            let picture = picture::picture_for(profile.as_ref(), &candidate.display_name);
            candidate.picture_url = Some(picture.url());
            candidate.picture_is_placeholder = picture.is_placeholder();

            if let Some(profile) = profile {
                fetched.insert(candidate.url.clone(), profile);
            }
        }
        fetched
    }
}

/// Returns the profile slug when `raw` is a personal profile URL.
///
/// A profile URL is an http(s) URL, on the configured host if one is set,
/// whose path has the profile segment followed by a non-empty slug.
pub fn profile_slug(raw: &str, config: &ResolverConfig) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    if let Some(ref wanted) = config.profile_host {
        let host = url.host_str()?;
        if host != wanted && !host.ends_with(&format!(".{wanted}")) {
            return None;
        }
    }

    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == config.profile_segment {
            return segments
                .next()
                .filter(|slug| !slug.is_empty())
                .map(String::from);
        }
    }
    None
}

/// Derives `(display_name, preview)` from a search result.
fn split_title(title: &str, snippet: &str, slug: &str) -> (String, String) {
    let mut parts = title.split(TITLE_SEPARATOR);
    let name = strip_site_suffix(parts.next().unwrap_or_default());
    let role = parts.next().map(strip_site_suffix).unwrap_or_default();

    let name = if name.is_empty() {
        EnrichedProfile::from_slug(slug).full_name()
    } else {
        name.to_string()
    };

    let preview = if role.is_empty() {
        ellipsize(snippet.trim())
    } else {
        ellipsize(role)
    };

    (name, preview)
}

/// Trims a trailing `| Site` decoration.
fn strip_site_suffix(text: &str) -> &str {
    text.split('|').next().unwrap_or_default().trim()
}

fn ellipsize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
