//! The ice-breaker summary: schema, parsing and the fallback value.

mod generator;
pub mod prompt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaParseError;

pub use generator::SummaryGenerator;

#[cfg(test)]
pub(crate) use generator::testing;
pub use prompt::PromptTemplate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub summary: String,
    pub facts: Vec<String>,
    #[serde(alias = "ice_breakers", alias = "questions")]
    pub ice_breakers: Vec<String>,
    #[serde(alias = "topics_of_interest")]
    pub topics_of_interest: Vec<String>,
    #[serde(
        default,
        alias = "profile_picture_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_picture_url: Option<String>,
}

impl Summary {
    /// Generic, schema-valid summary used whenever generation fails.
    pub fn fallback() -> Self {
        Self {
            summary: "Professional profile".to_string(),
            facts: vec![
                "Experienced professional".to_string(),
                "Active in their professional network".to_string(),
            ],
            ice_breakers: vec![
                "Tell me about your experience!".to_string(),
                "What's your favorite project?".to_string(),
                "How did you get started?".to_string(),
            ],
            topics_of_interest: vec!["Professional development".to_string()],
            profile_picture_url: None,
        }
    }
}

/// Parses raw model output into a [`Summary`].
///
/// Prose or Markdown fences around the JSON object are ignored.
pub fn parse_summary(raw: &str) -> Result<Summary, SchemaParseError> {
    let start = raw.find('{').ok_or(SchemaParseError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(SchemaParseError::NoJsonObject)?;
    if end < start {
        return Err(SchemaParseError::NoJsonObject);
    }
    Ok(serde_json::from_str(&raw[start..=end])?)
}
