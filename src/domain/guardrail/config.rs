//! Guardrail engine configuration

use serde::{Deserialize, Serialize};

/// Configuration for the guardrail engine.
///
/// Each detection family can be toggled independently; disabling a family
/// means its checks are simply not run, not that its findings are hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Detect structured identifiers and contact details
    #[serde(default = "default_true")]
    pub detect_pii: bool,
    /// Detect toxic or abusive phrasing
    #[serde(default = "default_true")]
    pub detect_toxicity: bool,
    /// Match queries and answers against the banned-topic denylist
    #[serde(default = "default_true")]
    pub detect_banned_topics: bool,
    /// Detect attempts to override system instructions (inbound only)
    #[serde(default = "default_true")]
    pub detect_prompt_injection: bool,
    /// Flag answers asserting facts without supporting evidence (outbound only)
    #[serde(default = "default_true")]
    pub detect_hallucination_risk: bool,
    /// Topics that must not be discussed
    #[serde(default = "default_banned_topics")]
    pub banned_topics: Vec<String>,
    /// Phrases treated as toxic content markers
    #[serde(default = "default_toxicity_terms")]
    pub toxicity_terms: Vec<String>,
    /// Minimum evidence relevance for an answer to count as supported
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
}

fn default_true() -> bool {
    true
}

fn default_relevance_threshold() -> f32 {
    0.6
}

fn default_banned_topics() -> Vec<String> {
    [
        "insider trading",
        "money laundering",
        "tax evasion",
        "market manipulation",
        "ponzi scheme",
        "pyramid scheme",
        "terrorism financing",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_toxicity_terms() -> Vec<String> {
    [
        "hate speech",
        "discrimination",
        "harassment",
        "violence",
        "self-harm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            detect_pii: true,
            detect_toxicity: true,
            detect_banned_topics: true,
            detect_prompt_injection: true,
            detect_hallucination_risk: true,
            banned_topics: default_banned_topics(),
            toxicity_terms: default_toxicity_terms(),
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

impl GuardrailConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle PII detection
    pub fn with_detect_pii(mut self, enabled: bool) -> Self {
        self.detect_pii = enabled;
        self
    }

    /// Toggle toxicity detection
    pub fn with_detect_toxicity(mut self, enabled: bool) -> Self {
        self.detect_toxicity = enabled;
        self
    }

    /// Toggle banned-topic detection
    pub fn with_detect_banned_topics(mut self, enabled: bool) -> Self {
        self.detect_banned_topics = enabled;
        self
    }

    /// Toggle prompt-injection detection
    pub fn with_detect_prompt_injection(mut self, enabled: bool) -> Self {
        self.detect_prompt_injection = enabled;
        self
    }

    /// Toggle hallucination-risk detection
    pub fn with_detect_hallucination_risk(mut self, enabled: bool) -> Self {
        self.detect_hallucination_risk = enabled;
        self
    }

    /// Replace the banned-topic denylist
    pub fn with_banned_topics(mut self, topics: Vec<String>) -> Self {
        self.banned_topics = topics;
        self
    }

    /// Set the relevance threshold for grounding support
    pub fn with_relevance_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardrailConfig::default();

        assert!(config.detect_pii);
        assert!(config.detect_toxicity);
        assert!(config.detect_banned_topics);
        assert!(config.detect_prompt_injection);
        assert!(config.detect_hallucination_risk);
        assert!(config.banned_topics.contains(&"money laundering".to_string()));
        assert_eq!(config.relevance_threshold, 0.6);
    }

    #[test]
    fn test_builder_pattern() {
        let config = GuardrailConfig::new()
            .with_detect_toxicity(false)
            .with_banned_topics(vec!["shell companies".to_string()])
            .with_relevance_threshold(0.8);

        assert!(!config.detect_toxicity);
        assert_eq!(config.banned_topics, vec!["shell companies".to_string()]);
        assert_eq!(config.relevance_threshold, 0.8);
    }

    #[test]
    fn test_threshold_clamping() {
        let config = GuardrailConfig::new().with_relevance_threshold(1.7);
        assert_eq!(config.relevance_threshold, 1.0);
    }
}
