//! Profile data shared by the pipeline stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A provisional profile match surfaced during resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCandidate {
    /// Unique within one resolution run
    pub url: String,
    pub display_name: String,
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// True when `picture_url` is a synthesized placeholder avatar
    #[serde(default)]
    pub picture_is_placeholder: bool,
}

impl ProfileCandidate {
    /// The candidate's real photo, if one was found.
    pub fn photo(&self) -> Option<&str> {
        if self.picture_is_placeholder {
            None
        } else {
            self.picture_url.as_deref()
        }
    }
}

/// A third party's knowledge of a person.
///
/// Well-known attributes are typed fields; everything else the provider
/// returned is kept in `extra`. Serializes back to one flat mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Removes `key` from `attrs` when it holds a string.
fn take_string(attrs: &mut Map<String, Value>, key: &str) -> Option<String> {
    match attrs.get(key) {
        Some(Value::String(_)) => match attrs.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

impl EnrichedProfile {
    /// Splits a provider attribute mapping into known fields and the residual.
    ///
    /// A known key holding a non-string value stays in `extra`.
    pub fn from_attributes(mut attrs: Map<String, Value>) -> Self {
        Self {
            first_name: take_string(&mut attrs, "firstName"),
            last_name: take_string(&mut attrs, "lastName"),
            headline: take_string(&mut attrs, "headline"),
            summary: take_string(&mut attrs, "summary"),
            photo_url: take_string(&mut attrs, "photoUrl"),
            extra: attrs,
        }
    }

    /// Minimal profile derived from a profile URL slug such as `jane-doe-1a2b3c`.
    ///
    /// Slug tokens containing digits are dropped.
    pub fn from_slug(slug: &str) -> Self {
        let words: Vec<String> = slug
            .split(['-', '_'])
            .filter(|w| !w.is_empty() && !w.chars().any(|c| c.is_ascii_digit()))
            .map(title_case)
            .collect();

        let first_name = words
            .first()
            .cloned()
            .unwrap_or_else(|| "Professional".to_string());
        let last_name = if words.len() > 1 {
            words.last().cloned()
        } else {
            None
        };

        Self {
            first_name: Some(first_name),
            last_name,
            headline: Some("Professional".to_string()),
            summary: Some("Experienced professional".to_string()),
            ..Self::default()
        }
    }

    /// "First Last", or whichever half is known.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Looks up a string attribute by its provider key, known or residual.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match key {
            "firstName" => self.first_name.as_deref(),
            "lastName" => self.last_name.as_deref(),
            "headline" => self.headline.as_deref(),
            "summary" => self.summary.as_deref(),
            "photoUrl" => self.photo_url.as_deref(),
            other => self.extra.get(other).and_then(Value::as_str),
        }
    }

    /// Number of attributes held, known and residual.
    pub fn attribute_count(&self) -> usize {
        [
            &self.first_name,
            &self.last_name,
            &self.headline,
            &self.summary,
            &self.photo_url,
        ]
        .into_iter()
        .filter(|field| field.is_some())
        .count()
            + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.headline.is_none()
            && self.summary.is_none()
            && self.photo_url.is_none()
            && self.extra.is_empty()
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
