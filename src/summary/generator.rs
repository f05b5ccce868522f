use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use super::prompt::{PromptTemplate, SYSTEM_PROMPT};
use super::{parse_summary, Summary};
use crate::llm::{LlmClient, Message};
use crate::profile::EnrichedProfile;

/// Turns an enriched profile into a [`Summary`] with the LLM.
pub struct SummaryGenerator {
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
}

impl SummaryGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, template: PromptTemplate) -> Self {
        Self { llm, template }
    }

    /// Always returns a complete summary: any failure yields
    /// [`Summary::fallback`]. The picture URL comes from the profile.
    pub async fn summarize(&self, profile: &EnrichedProfile) -> Summary {
        let mut summary = match self.generate(profile).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summary generation failed, using fallback: {e:#}");
                Summary::fallback()
            }
        };
        summary.profile_picture_url = profile.photo_url.clone();
        summary
    }

    async fn generate(&self, profile: &EnrichedProfile) -> Result<Summary> {
        let prompt = self.template.render(profile)?;
        debug!("Summary prompt: {} chars", prompt.len());

        let response = self
            .llm
            .complete(SYSTEM_PROMPT, &[Message::user(prompt)])
            .await?;

        debug!(
            "Summary completion: {} in / {} out tokens",
            response.input_tokens, response.output_tokens
        );

        let summary = parse_summary(&response.text)?;
        info!(
            "Generated summary via {}: {} facts, {} ice breakers",
            self.llm.description(),
            summary.facts.len(),
            summary.ice_breakers.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::llm::LlmResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned answers in order; errors once they run out.
    #[derive(Default)]
    pub struct CannedLlm {
        pub answers: Mutex<Vec<String>>,
        pub prompts: Mutex<Vec<String>>,
        pub usage: (u32, u32),
    }

    impl CannedLlm {
        pub fn with(answers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().rev().map(|a| a.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
                usage: (0, 0),
            })
        }

        /// Like [`CannedLlm::with`], reporting token usage on every answer.
        pub fn with_usage(answers: &[&str], input_tokens: u32, output_tokens: u32) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().rev().map(|a| a.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
                usage: (input_tokens, output_tokens),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, _system_prompt: &str, messages: &[Message]) -> Result<LlmResponse> {
            self.prompts
                .lock()
                .unwrap()
                .extend(messages.iter().map(|m| m.content.clone()));
            let text = self
                .answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("LLM unavailable"))?;
            Ok(LlmResponse {
                text,
                input_tokens: self.usage.0,
                output_tokens: self.usage.1,
            })
        }

        fn description(&self) -> String {
            "canned".to_string()
        }
    }
}
