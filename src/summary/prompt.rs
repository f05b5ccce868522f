//! Prompt template for the summary generator.
//!
//! A template is plain text with two placeholders: `{profile}` receives
//! the serialized profile, `{format_instructions}` the output schema.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::profile::EnrichedProfile;

const PROFILE_PLACEHOLDER: &str = "{profile}";
const FORMAT_PLACEHOLDER: &str = "{format_instructions}";

/// System prompt sent with every summary request.
pub const SYSTEM_PROMPT: &str =
    "You are a networking expert helping someone prepare to connect with a professional.";

const DEFAULT_TEMPLATE: &str = "\
Here is the professional profile of the person they are about to meet:

{profile}

Prepare them for the conversation:

1. Summary: two or three sentences on what makes this person's career distinctive \
(their path, expertise and impact).
2. Facts: exactly two specific, notable facts from their background.
3. Ice breakers: exactly three open-ended questions tailored to this profile. \
Refer to their actual work or expertise; avoid generic questions such as \
\"how did you get started\".
4. Topics of interest: the subjects where a meaningful professional conversation could develop.

{format_instructions}";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Validates a custom template: both placeholders must be present.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [PROFILE_PLACEHOLDER, FORMAT_PLACEHOLDER] {
            if !template.contains(placeholder) {
                anyhow::bail!("prompt template is missing the {placeholder} placeholder");
            }
        }
        Ok(Self { template })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
        Self::new(content)
    }

    pub fn render(&self, profile: &EnrichedProfile) -> Result<String> {
        let profile_json =
            serde_json::to_string_pretty(profile).context("Failed to serialize profile")?;
        Ok(self
            .template
            .replace(FORMAT_PLACEHOLDER, &format_instructions())
            .replace(PROFILE_PLACEHOLDER, &profile_json))
    }
}

/// Machine-readable description of the summary schema.
pub fn format_instructions() -> String {
    let schema = json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "Short professional synopsis"
            },
            "facts": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Two notable facts about them"
            },
            "iceBreakers": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Three open-ended conversation-starter questions"
            },
            "topicsOfInterest": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Topics they are likely interested in"
            },
            "profilePictureUrl": {
                "type": "string",
                "description": "URL of their profile picture, if known"
            }
        },
        "required": ["summary", "facts", "iceBreakers", "topicsOfInterest"]
    });

    format!(
        "Answer with a single JSON object that conforms to this JSON schema. \
         Do not wrap it in Markdown and do not add any other text.\n\n{}",
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    )
}
