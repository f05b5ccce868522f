//! Profile enrichment: turns a profile URL into an [`EnrichedProfile`].
//!
//! Two sources sit behind [`ProfileSource`]:
//! - **Scrapin**: the live enrichment API (costs credits)
//! - **Fixture**: a canned payload served from a stable URL, for demos
//!   and offline runs

mod fixture;
mod scrapin;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::EnrichmentConfig;
use crate::error::EnrichmentError;
use crate::profile::EnrichedProfile;

pub use fixture::FixtureSource;
pub use scrapin::ScrapinSource;

/// Attributes dropped from every profile before it reaches the LLM.
const DENY_LISTED_ATTRIBUTES: &[&str] = &["certifications"];

/// A backend that returns the raw provider document for a profile URL.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, profile_url: &str) -> Result<Value, EnrichmentError>;

    /// Short name for logs (e.g. `"scrapin"`).
    fn source_name(&self) -> &str;
}

/// Wraps the live and offline sources and sanitizes what they return.
pub struct ProfileEnricher {
    live: Arc<dyn ProfileSource>,
    fixture: Arc<dyn ProfileSource>,
}

impl ProfileEnricher {
    pub fn new(live: Arc<dyn ProfileSource>, fixture: Arc<dyn ProfileSource>) -> Self {
        Self { live, fixture }
    }

    pub fn from_config(config: &EnrichmentConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(ScrapinSource::new(config)?),
            Arc::new(FixtureSource::new(config)?),
        ))
    }

    /// Fetches and sanitizes the profile behind `profile_url`.
    ///
    /// In offline mode the fixture document is returned whatever the URL.
    pub async fn enrich(
        &self,
        profile_url: &str,
        offline: bool,
    ) -> Result<EnrichedProfile, EnrichmentError> {
        let source = if offline { &self.fixture } else { &self.live };
        debug!("Enriching {profile_url} via {}", source.source_name());

        let payload = source.fetch_profile(profile_url).await?;
        let attrs = extract_person(payload, offline)?;
        let profile = EnrichedProfile::from_attributes(sanitize(attrs));
        if profile.is_empty() {
            warn!("Enrichment of {profile_url} returned no usable attributes");
        }

        info!(
            "Enriched profile for {profile_url}: {} attributes",
            profile.attribute_count()
        );

        Ok(profile)
    }
}

/// Pulls the attribute mapping out of a provider document.
///
/// The live API wraps it in a top-level `person` object; canned fixtures
/// may also be the bare mapping, as long as they have no `person` key.
fn extract_person(payload: Value, allow_bare: bool) -> Result<Map<String, Value>, EnrichmentError> {
    let Value::Object(mut doc) = payload else {
        return Err(EnrichmentError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    match doc.remove("person") {
        Some(Value::Object(person)) => Ok(person),
        None if allow_bare && !doc.is_empty() => Ok(doc),
        _ => Err(EnrichmentError::MissingPayload),
    }
}

/// Drops empty strings, empty lists, nulls and deny-listed attributes.
pub fn sanitize(attrs: Map<String, Value>) -> Map<String, Value> {
    attrs
        .into_iter()
        .filter(|(key, value)| {
            !DENY_LISTED_ATTRIBUTES.contains(&key.as_str()) && !is_empty_value(value)
        })
        .collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_enrich_drops_empty_values() {
        let live = StaticSource::ok(json!({
            "success": true,
            "person": {
                "firstName": "Jane",
                "lastName": "Doe",
                "headline": "",
                "summary": "Engineer",
                "photoUrl": "http://img/x.png"
            }
        }));
        let enricher = ProfileEnricher::new(live, StaticSource::failing());

        let profile = enricher
            .enrich("https://example.com/in/janedoe123", false)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "summary": "Engineer",
                "photoUrl": "http://img/x.png"
            })
        );
    }

    #[tokio::test]
    async fn test_enrich_offline_uses_fixture() {
        let live = StaticSource::failing();
        let fixture = StaticSource::ok(json!({"firstName": "Tatjana", "certifications": [{"name": "X"}]}));
        let enricher = ProfileEnricher::new(live.clone(), fixture.clone());

        let profile = enricher.enrich("https://example.com/in/anyone", true).await.unwrap();

        assert_eq!(profile.first_name.as_deref(), Some("Tatjana"));
        assert!(profile.extra.get("certifications").is_none());
        assert_eq!(live.call_count(), 0);
        assert_eq!(fixture.call_count(), 1);
    }

    #[tokio::test]
    async fn test_enrich_live_requires_person_payload() {
        let live = StaticSource::ok(json!({"success": false, "msg": "not found"}));
        let enricher = ProfileEnricher::new(live, StaticSource::failing());

        let err = enricher.enrich("https://example.com/in/x", false).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::MissingPayload));
    }

    #[tokio::test]
    async fn test_enrich_propagates_source_error() {
        let enricher = ProfileEnricher::new(StaticSource::failing(), StaticSource::failing());
        assert!(enricher.enrich("https://example.com/in/x", false).await.is_err());
    }

    #[test]
    fn test_sanitize() {
        let attrs = json!({
            "firstName": "Jane",
            "headline": "",
            "skills": [],
            "middleName": null,
            "certifications": [{"name": "AWS"}],
            "location": {},
            "connections": 0
        });
        let clean = sanitize(attrs.as_object().cloned().unwrap());
        assert_eq!(
            Value::Object(clean),
            json!({"firstName": "Jane", "location": {}, "connections": 0})
        );
    }

    #[test]
    fn test_extract_person_wrapped() {
        let attrs = extract_person(json!({"person": {"firstName": "Jane"}}), false).unwrap();
        assert_eq!(attrs["firstName"], "Jane");
    }

    #[test]
    fn test_extract_person_bare_only_when_allowed() {
        let doc = json!({"firstName": "Jane"});
        assert!(extract_person(doc.clone(), true).is_ok());
        assert!(matches!(
            extract_person(doc, false),
            Err(EnrichmentError::MissingPayload)
        ));
    }

    #[test]
    fn test_extract_person_null_payload() {
        assert!(matches!(
            extract_person(json!({"person": null}), false),
            Err(EnrichmentError::MissingPayload)
        ));
    }

    #[test]
    fn test_extract_person_null_payload_not_taken_as_bare() {
        assert!(matches!(
            extract_person(json!({"person": null, "success": true}), true),
            Err(EnrichmentError::MissingPayload)
        ));
        assert!(matches!(
            extract_person(json!({"person": "n/a", "firstName": "Jane"}), true),
            Err(EnrichmentError::MissingPayload)
        ));
    }

    #[test]
    fn test_extract_person_non_object() {
        assert!(matches!(
            extract_person(json!([1, 2, 3]), true),
            Err(EnrichmentError::Malformed(_))
        ));
    }
}
