//! The lookup pipeline: name → profile URL → enriched profile → summary.
//!
//! [`Pipeline`] owns every stage and exposes the entry points the
//! front end calls. Each call is one independent run; nothing is shared
//! between runs apart from the read-only configuration and HTTP clients.

use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, EnrichmentFailurePolicy, ResolverConfig};
use crate::enrichment::ProfileEnricher;
use crate::error::PipelineError;
use crate::llm::{self, LlmClient};
use crate::profile::{EnrichedProfile, ProfileCandidate};
use crate::resolver::picture::Placeholder;
use crate::resolver::{profile_slug, CandidateResolver, SingleUrlFinder};
use crate::search::{self, SearchProvider};
use crate::selector::{select, CandidateChooser, Decision};
use crate::summary::{PromptTemplate, Summary, SummaryGenerator};

/// External collaborators the pipeline talks to.
pub struct Providers {
    pub search: Arc<dyn SearchProvider>,
    pub llm: Arc<dyn LlmClient>,
    pub enricher: Arc<ProfileEnricher>,
}

pub struct Pipeline {
    resolver: CandidateResolver,
    url_finder: SingleUrlFinder,
    enricher: Arc<ProfileEnricher>,
    summarizer: SummaryGenerator,
    resolver_config: ResolverConfig,
    on_failure: EnrichmentFailurePolicy,
    offline: bool,
}

impl Pipeline {
    pub fn new(
        providers: Providers,
        template: PromptTemplate,
        config: &Config,
        offline: bool,
    ) -> Self {
        let Providers {
            search,
            llm,
            enricher,
        } = providers;

        Self {
            resolver: CandidateResolver::new(
                search.clone(),
                enricher.clone(),
                config.resolver.clone(),
                offline,
            ),
            url_finder: SingleUrlFinder::new(search, llm.clone(), config.resolver.clone()),
            enricher,
            summarizer: SummaryGenerator::new(llm, template),
            resolver_config: config.resolver.clone(),
            on_failure: config.enrichment.on_failure,
            offline,
        }
    }

    /// Builds the live providers named in `config`.
    pub fn from_config(config: &Config, offline: bool) -> anyhow::Result<Self> {
        let llm = llm::from_config(&config.llm)?;
        let search = search::from_config(&config.search)?;
        let enricher = Arc::new(ProfileEnricher::from_config(&config.enrichment)?);
        let template = match config.summary.template_path {
            Some(ref path) => PromptTemplate::load(path)?,
            None => PromptTemplate::default(),
        };

        info!("LLM: {}", llm.description());
        info!("Search: {}", search.provider_name());
        if offline {
            info!("Enrichment: offline fixture {}", config.enrichment.fixture_url);
        } else {
            info!("Enrichment: {}", config.enrichment.endpoint);
        }

        Ok(Self::new(
            Providers {
                search,
                llm,
                enricher,
            },
            template,
            config,
            offline,
        ))
    }

    /// Profile candidates for `name`, best first. Never fails.
    pub async fn resolve_candidates(&self, name: &str) -> Vec<ProfileCandidate> {
        let span = info_span!("resolve", run_id = %Uuid::new_v4());
        self.resolver.resolve_candidates(name).instrument(span).await
    }

    /// Summary and photo URL for a known profile URL.
    pub async fn enrich_and_summarize(
        &self,
        profile_url: &str,
    ) -> Result<(Summary, String), PipelineError> {
        let span = info_span!("enrich", run_id = %Uuid::new_v4(), url = profile_url);
        self.summarize_url(profile_url, None, None).instrument(span).await
    }

    /// Resolves `name` and summarizes the best match.
    ///
    /// With several candidates the first one is used.
    pub async fn lookup_and_summarize(
        &self,
        name: &str,
    ) -> Result<(Summary, String), PipelineError> {
        self.lookup(name, None).await
    }

    /// Like [`lookup_and_summarize`](Self::lookup_and_summarize), but lets
    /// `chooser` pick when the name is ambiguous. The chosen candidate's
    /// photo, if real, wins over the provider's.
    pub async fn lookup_with_chooser(
        &self,
        name: &str,
        chooser: &dyn CandidateChooser,
    ) -> Result<(Summary, String), PipelineError> {
        self.lookup(name, Some(chooser)).await
    }

    async fn lookup(
        &self,
        name: &str,
        chooser: Option<&dyn CandidateChooser>,
    ) -> Result<(Summary, String), PipelineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PipelineError::EmptyName);
        }

        let span = info_span!("lookup", run_id = %Uuid::new_v4(), person = name);
        self.run_lookup(name, chooser).instrument(span).await
    }

    async fn run_lookup(
        &self,
        name: &str,
        chooser: Option<&dyn CandidateChooser>,
    ) -> Result<(Summary, String), PipelineError> {
        let candidates = self.resolver.search_candidates(name).await;

        match select(candidates) {
            Decision::Proceed(url) => {
                info!("Single match: {url}");
                self.summarize_url(&url, None, None).await
            }
            Decision::AskUser(mut candidates) => {
                let (chosen, photo_override, prefetched) = match chooser {
                    Some(chooser) => {
                        let mut fetched = self.resolver.attach_pictures(&mut candidates).await;
                        let index = chooser
                            .choose(&candidates)
                            .ok_or(PipelineError::SelectionCancelled)?;
                        let chosen = candidates
                            .into_iter()
                            .nth(index)
                            .ok_or(PipelineError::SelectionCancelled)?;
                        let photo = chosen.photo().map(String::from);
                        let prefetched = fetched.remove(&chosen.url);
                        (chosen, photo, prefetched)
                    }
                    None => {
                        info!("{} candidates, using the first", candidates.len());
                        let first = candidates
                            .into_iter()
                            .next()
                            .ok_or_else(|| PipelineError::NoProfileFound(name.to_string()))?;
                        (first, None, None)
                    }
                };
                info!("Selected {}", chosen.url);
                self.summarize_url(&chosen.url, photo_override, prefetched).await
            }
            Decision::Fallback => {
                info!("No candidates, trying single-URL lookup");
                let url = self
                    .url_finder
                    .find(name)
                    .await
                    .ok_or_else(|| PipelineError::NoProfileFound(name.to_string()))?;
                self.summarize_url(&url, None, None).await
            }
        }
    }

    /// `prefetched` is the profile already enriched for `profile_url`, if any.
    async fn summarize_url(
        &self,
        profile_url: &str,
        photo_override: Option<String>,
        prefetched: Option<EnrichedProfile>,
    ) -> Result<(Summary, String), PipelineError> {
        let profile = match prefetched {
            Some(profile) => profile,
            None => self.load_profile(profile_url).await?,
        };
        let summary = self.summarizer.summarize(&profile).await;
        let photo = choose_photo(
            photo_override,
            summary.profile_picture_url.as_deref(),
            &profile.full_name(),
        );
        Ok((summary, photo))
    }

    async fn load_profile(&self, profile_url: &str) -> Result<EnrichedProfile, PipelineError> {
        match self.enricher.enrich(profile_url, self.offline).await {
            Ok(profile) => Ok(profile),
            Err(e) => match self.on_failure {
                EnrichmentFailurePolicy::Abort => {
                    error!("Enrichment of {profile_url} failed: {e}");
                    Err(e.into())
                }
                EnrichmentFailurePolicy::Synthesize => {
                    warn!("Enrichment of {profile_url} failed ({e}), synthesizing from the URL");
                    let slug = profile_slug(profile_url, &self.resolver_config).unwrap_or_default();
                    Ok(EnrichedProfile::from_slug(&slug))
                }
            },
        }
    }
}

/// User override, then provider photo, then a placeholder for `name`.
fn choose_photo(user_override: Option<String>, provider_photo: Option<&str>, name: &str) -> String {
    user_override
        .or_else(|| provider_photo.map(String::from))
        .unwrap_or_else(|| Placeholder::for_name(name).url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::testing::StaticSource;
    use crate::search::testing::{result, ScriptedSearch};
    use crate::summary::testing::CannedLlm;
    use serde_json::json;

    const SUMMARY_JSON: &str = r#"{
        "summary": "Jane leads platform engineering at Acme.",
        "facts": ["Built Acme's data platform", "Speaks at RustConf"],
        "iceBreakers": ["q1", "q2", "q3"],
        "topicsOfInterest": ["Rust"]
    }"#;

    fn jane_payload() -> serde_json::Value {
        json!({
            "person": {
                "firstName": "Jane",
                "lastName": "Doe",
                "headline": "",
                "summary": "Engineer",
                "photoUrl": "http://img/x.png"
            }
        })
    }

    fn config(on_failure: EnrichmentFailurePolicy) -> Config {
        let mut config =
            Config::parse("[llm]\nprovider = \"ollama\"\nmodel = \"llama3.2:3b\"\n").unwrap();
        config.resolver.fetch_pictures = false;
        config.enrichment.on_failure = on_failure;
        config
    }

    fn build_with(
        search: Arc<ScriptedSearch>,
        llm: Arc<CannedLlm>,
        live: Arc<StaticSource>,
        config: &Config,
    ) -> Pipeline {
        let enricher = Arc::new(ProfileEnricher::new(live, StaticSource::failing()));
        Pipeline::new(
            Providers {
                search,
                llm,
                enricher,
            },
            PromptTemplate::default(),
            config,
            false,
        )
    }

    fn build(
        search: Arc<ScriptedSearch>,
        llm: Arc<CannedLlm>,
        live: Arc<StaticSource>,
        on_failure: EnrichmentFailurePolicy,
    ) -> Pipeline {
        build_with(search, llm, live, &config(on_failure))
    }

    /// Default resolver settings: candidate pictures are fetched.
    fn with_pictures(
        search: Arc<ScriptedSearch>,
        llm: Arc<CannedLlm>,
        live: Arc<StaticSource>,
    ) -> Pipeline {
        let mut config = config(EnrichmentFailurePolicy::Abort);
        config.resolver.fetch_pictures = true;
        build_with(search, llm, live, &config)
    }

    fn three_janes() -> Arc<ScriptedSearch> {
        Arc::new(ScriptedSearch::default().answer(
            "Jane Doe",
            vec![
                result("https://example.com/in/jane-1", "Jane Doe - CTO", ""),
                result("https://example.com/in/jane-2", "Jane Doe - Designer", ""),
                result("https://example.com/in/jane-3", "Jane Doe - Teacher", ""),
            ],
        ))
    }

    fn aborting(
        search: Arc<ScriptedSearch>,
        llm: Arc<CannedLlm>,
        live: Arc<StaticSource>,
    ) -> Pipeline {
        build(search, llm, live, EnrichmentFailurePolicy::Abort)
    }

    fn two_janes() -> Arc<ScriptedSearch> {
        Arc::new(ScriptedSearch::default().answer(
            "Jane Doe",
            vec![
                result("https://example.com/in/jane-1", "Jane Doe - CTO", ""),
                result("https://example.com/in/jane-2", "Jane Doe - Designer", ""),
            ],
        ))
    }

    struct PickIndex(Option<usize>);

    impl CandidateChooser for PickIndex {
        fn choose(&self, _candidates: &[ProfileCandidate]) -> Option<usize> {
            self.0
        }
    }

    #[tokio::test]
    async fn test_lookup_single_candidate() {
        let search = Arc::new(ScriptedSearch::default().answer(
            "Jane Doe",
            vec![result("https://example.com/in/janedoe123", "Jane Doe - Senior Engineer", "")],
        ));
        let live = StaticSource::ok(jane_payload());
        let pipeline = aborting(search, CannedLlm::with(&[SUMMARY_JSON]), live.clone());

        let (summary, photo) = pipeline.lookup_and_summarize("Jane Doe").await.unwrap();

        assert_eq!(live.requested(), vec!["https://example.com/in/janedoe123"]);
        assert_eq!(summary.summary, "Jane leads platform engineering at Acme.");
        assert_eq!(summary.profile_picture_url.as_deref(), Some("http://img/x.png"));
        assert_eq!(photo, "http://img/x.png");
    }

    #[tokio::test]
    async fn test_lookup_ambiguous_without_chooser_takes_first() {
        let live = StaticSource::ok(jane_payload());
        let pipeline = aborting(two_janes(), CannedLlm::with(&[SUMMARY_JSON]), live.clone());

        pipeline.lookup_and_summarize("Jane Doe").await.unwrap();

        assert_eq!(live.requested(), vec!["https://example.com/in/jane-1"]);
    }

    #[tokio::test]
    async fn test_lookup_with_chooser_uses_choice() {
        let live = StaticSource::ok(jane_payload());
        let pipeline = aborting(two_janes(), CannedLlm::with(&[SUMMARY_JSON]), live.clone());

        pipeline
            .lookup_with_chooser("Jane Doe", &PickIndex(Some(1)))
            .await
            .unwrap();

        assert_eq!(live.requested(), vec!["https://example.com/in/jane-2"]);
    }

    #[tokio::test]
    async fn test_lookup_without_chooser_enriches_only_the_pick() {
        let live = StaticSource::ok(jane_payload());
        let pipeline = with_pictures(three_janes(), CannedLlm::with(&[SUMMARY_JSON]), live.clone());

        let (summary, photo) = pipeline.lookup_and_summarize("Jane Doe").await.unwrap();

        assert_eq!(live.requested(), vec!["https://example.com/in/jane-1"]);
        assert_eq!(summary.ice_breakers, vec!["q1", "q2", "q3"]);
        assert_eq!(photo, "http://img/x.png");
    }

    #[tokio::test]
    async fn test_lookup_with_chooser_reuses_picture_enrichment() {
        let live = StaticSource::ok(jane_payload());
        let llm = CannedLlm::with(&[SUMMARY_JSON]);
        let pipeline = with_pictures(three_janes(), llm.clone(), live.clone());

        let (_, photo) = pipeline
            .lookup_with_chooser("Jane Doe", &PickIndex(Some(1)))
            .await
            .unwrap();

        assert_eq!(
            live.requested(),
            vec![
                "https://example.com/in/jane-1",
                "https://example.com/in/jane-2",
                "https://example.com/in/jane-3",
            ]
        );
        assert_eq!(photo, "http://img/x.png");
        assert!(llm.prompts()[0].contains("\"firstName\": \"Jane\""));
    }

    #[tokio::test]
    async fn test_single_match_skips_picture_enrichment() {
        let search = Arc::new(ScriptedSearch::default().answer(
            "Jane Doe",
            vec![result("https://example.com/in/jane-1", "Jane Doe - CTO", "")],
        ));
        let live = StaticSource::ok(jane_payload());
        let pipeline = with_pictures(search, CannedLlm::with(&[SUMMARY_JSON]), live.clone());

        pipeline
            .lookup_with_chooser("Jane Doe", &PickIndex(Some(0)))
            .await
            .unwrap();

        assert_eq!(live.requested(), vec!["https://example.com/in/jane-1"]);
    }

    #[tokio::test]
    async fn test_lookup_with_chooser_declined() {
        let pipeline = aborting(
            two_janes(),
            CannedLlm::with(&[SUMMARY_JSON]),
            StaticSource::ok(jane_payload()),
        );

        let err = pipeline
            .lookup_with_chooser("Jane Doe", &PickIndex(None))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::SelectionCancelled));

        let err = pipeline
            .lookup_with_chooser("Jane Doe", &PickIndex(Some(7)))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::SelectionCancelled));
    }

    #[tokio::test]
    async fn test_lookup_falls_back_to_single_url() {
        let llm = CannedLlm::with(&["https://www.linkedin.com/in/jane-doe", SUMMARY_JSON]);
        let live = StaticSource::ok(jane_payload());
        let pipeline = aborting(Arc::new(ScriptedSearch::default()), llm, live.clone());

        let (summary, _) = pipeline.lookup_and_summarize("Jane Doe").await.unwrap();

        assert_eq!(live.requested(), vec!["https://www.linkedin.com/in/jane-doe"]);
        assert_eq!(summary.ice_breakers, vec!["q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn test_lookup_nothing_found() {
        let pipeline = aborting(
            Arc::new(ScriptedSearch::default()),
            CannedLlm::with(&["I don't know."]),
            StaticSource::ok(jane_payload()),
        );

        let err = pipeline.lookup_and_summarize("Jane Doe").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoProfileFound(ref name) if name == "Jane Doe"));
    }

    #[tokio::test]
    async fn test_lookup_empty_name() {
        let search = Arc::new(ScriptedSearch::default());
        let pipeline = aborting(
            search.clone(),
            CannedLlm::failing(),
            StaticSource::failing(),
        );

        let err = pipeline.lookup_and_summarize("  ").await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyName));
        assert!(search.issued().is_empty());
    }

    #[tokio::test]
    async fn test_enrichment_failure_aborts() {
        let pipeline = aborting(
            Arc::new(ScriptedSearch::default()),
            CannedLlm::with(&[SUMMARY_JSON]),
            StaticSource::failing(),
        );

        let err = pipeline
            .enrich_and_summarize("https://www.linkedin.com/in/jane-doe")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Enrichment(_)));
    }

    #[tokio::test]
    async fn test_enrichment_failure_synthesizes_from_slug() {
        let llm = CannedLlm::with(&[SUMMARY_JSON]);
        let pipeline = build(
            Arc::new(ScriptedSearch::default()),
            llm.clone(),
            StaticSource::failing(),
            EnrichmentFailurePolicy::Synthesize,
        );

        let (summary, photo) = pipeline
            .enrich_and_summarize("https://www.linkedin.com/in/jane-doe-1a2b")
            .await
            .unwrap();

        assert!(llm.prompts()[0].contains("\"firstName\": \"Jane\""));
        assert!(llm.prompts()[0].contains("\"lastName\": \"Doe\""));
        assert!(summary.profile_picture_url.is_none());
        assert_eq!(photo, Placeholder::for_name("Jane Doe").url());
    }

    #[tokio::test]
    async fn test_summary_failure_still_returns_complete_summary() {
        let pipeline = aborting(
            Arc::new(ScriptedSearch::default()),
            CannedLlm::with(&["not json at all"]),
            StaticSource::ok(jane_payload()),
        );

        let (summary, photo) = pipeline
            .enrich_and_summarize("https://www.linkedin.com/in/jane-doe")
            .await
            .unwrap();

        assert_eq!(summary.facts, Summary::fallback().facts);
        assert_eq!(summary.ice_breakers.len(), 3);
        assert_eq!(photo, "http://img/x.png");
    }

    #[tokio::test]
    async fn test_resolve_candidates_entry_point() {
        let pipeline = aborting(two_janes(), CannedLlm::failing(), StaticSource::failing());
        let candidates = pipeline.resolve_candidates("Jane Doe").await;
        assert_eq!(candidates.len(), 2);
    }

    // ── Photo precedence ─────────────────────────────────

    #[test]
    fn test_choose_photo_precedence() {
        assert_eq!(
            choose_photo(
                Some("https://user.example/pick.jpg".to_string()),
                Some("http://img/x.png"),
                "Jane Doe"
            ),
            "https://user.example/pick.jpg"
        );
        assert_eq!(
            choose_photo(None, Some("http://img/x.png"), "Jane Doe"),
            "http://img/x.png"
        );
        assert_eq!(
            choose_photo(None, None, "Jane Doe"),
            Placeholder::for_name("Jane Doe").url()
        );
    }
}
