//! Answer generator - grounding prompt construction and fallback handling

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::completion::{CompletionProvider, CompletionRequest};
use crate::domain::retrieval::Evidence;
use crate::domain::DomainError;

/// Answer returned when no evidence clears the retrieval threshold.
/// Deterministic: the completion service is not consulted.
pub const NO_EVIDENCE_ANSWER: &str = "I could not find a relevant policy passage for this \
     question. Please consult the policy library directly or rephrase the question with more \
     specific terms.";

/// Canned answer substituted when the completion service is unavailable.
pub const SERVICE_FALLBACK_ANSWER: &str = "[Automated fallback] The answer-generation service \
     is currently unavailable, so no generated answer can be provided. The retrieved policy \
     excerpts are cited below; please review them directly.";

const SYSTEM_PROMPT: &str = "You are a risk management assistant for a bank. Answer the \
     question using only the provided policy excerpts. Be precise and professional, and say so \
     explicitly when the excerpts do not cover the question.";

/// Configuration for answer generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Sampling temperature for the completion call
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Cap on grounding-context characters included in the prompt
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// Timeout for the completion call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_max_context_chars() -> usize {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_context_chars: default_max_context_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the grounding-context character cap
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }

    /// Set the completion timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Produces a draft answer grounded in exactly the evidence it is given.
///
/// The generator never invents evidence: with an empty evidence list it
/// returns [`NO_EVIDENCE_ANSWER`] without consulting the completion service.
/// Completion outages surface as errors so the orchestrator can substitute
/// [`SERVICE_FALLBACK_ANSWER`] and record the failed stage.
#[derive(Debug, Clone)]
pub struct AnswerGenerator {
    provider: Arc<dyn CompletionProvider>,
    config: GeneratorConfig,
}

impl AnswerGenerator {
    /// Create a new generator over the given provider
    pub fn new(provider: Arc<dyn CompletionProvider>, config: GeneratorConfig) -> Self {
        Self { provider, config }
    }

    /// Get the generator configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a draft answer for the query from the supplied evidence
    pub async fn generate(
        &self,
        query: &str,
        evidence: &[Evidence],
    ) -> Result<String, DomainError> {
        if evidence.is_empty() {
            debug!("No evidence available, returning no-evidence answer");
            return Ok(NO_EVIDENCE_ANSWER.to_string());
        }

        let prompt = self.build_prompt(query, evidence);
        let request = CompletionRequest::new(prompt)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let response = tokio::time::timeout(timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                DomainError::provider(
                    self.provider.provider_name(),
                    format!("completion timed out after {:?}", timeout),
                )
            })??;

        Ok(response.text)
    }

    /// Build the grounding prompt from exactly the supplied evidence,
    /// truncated to the configured context budget.
    fn build_prompt(&self, query: &str, evidence: &[Evidence]) -> String {
        let mut context_parts = Vec::new();
        let mut total_chars = 0;

        for item in evidence {
            let header = match &item.section {
                Some(section) => format!("[Source: {} ({})]", item.document_id, section),
                None => format!("[Source: {}]", item.document_id),
            };
            let part = format!("{}\n{}", header, item.excerpt);

            if total_chars + part.len() > self.config.max_context_chars
                && !context_parts.is_empty()
            {
                break;
            }

            total_chars += part.len();
            context_parts.push(part);
        }

        format!(
            "Policy excerpts:\n{}\n\nQuestion: {}\n\nAnswer:",
            context_parts.join("\n---\n"),
            query
        )
    }
}
