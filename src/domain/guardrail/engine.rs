//! Guardrail evaluation engine

use once_cell::sync::Lazy;
use regex::Regex;

use super::config::GuardrailConfig;
use super::violation::{Severity, Violation, ViolationCategory};

/// Direction of the text being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// User-supplied text entering the pipeline
    Inbound,
    /// Generated text about to leave the pipeline
    Outbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
        }
    }
}

/// Kinds of PII the engine recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PiiKind {
    AccountNumber,
    NationalId,
    Iban,
    Passport,
    Email,
    Phone,
}

impl PiiKind {
    fn label(self) -> &'static str {
        match self {
            Self::AccountNumber => "account number",
            Self::NationalId => "national ID",
            Self::Iban => "IBAN",
            Self::Passport => "passport number",
            Self::Email => "email address",
            Self::Phone => "phone number",
        }
    }

    /// Structured financial identifiers block by default; contact details
    /// are recorded but pass through.
    fn inbound_severity(self) -> Severity {
        match self {
            Self::AccountNumber | Self::NationalId | Self::Iban | Self::Passport => {
                Severity::Critical
            }
            Self::Email | Self::Phone => Severity::Medium,
        }
    }
}

static PII_PATTERNS: Lazy<Vec<(PiiKind, Regex)>> = Lazy::new(|| {
    vec![
        (
            PiiKind::AccountNumber,
            Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").unwrap(),
        ),
        (
            PiiKind::NationalId,
            Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
        ),
        (
            PiiKind::Iban,
            Regex::new(r"\b[A-Z]{2}\d{2}[A-Z0-9]{4}\d{7}[A-Z0-9]{0,16}\b").unwrap(),
        ),
        (PiiKind::Passport, Regex::new(r"\b[A-Z][0-9]{8}\b").unwrap()),
        (
            PiiKind::Email,
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
        ),
        (
            PiiKind::Phone,
            Regex::new(r"\b(?:\+?1[-.]?)?\(?[0-9]{3}\)?[-.]?[0-9]{3}[-.]?[0-9]{4}\b").unwrap(),
        ),
    ]
});

static INJECTION_PHRASES: &[&str] = &[
    "ignore previous instructions",
    "ignore all previous instructions",
    "disregard all rules",
    "pretend you are",
    "act as if",
    "bypass safety",
    "jailbreak",
];

static HALLUCINATION_MARKERS: &[&str] = &[
    "as an ai language model",
    "i don't have access to",
    "my training data",
];

/// Pure evaluation engine for safety checks.
///
/// `evaluate` is a function of the input text and direction only: it never
/// mutates text, never blocks, and returns the same violations for the same
/// input, which keeps audit trails reproducible. Blocking and redaction are
/// decided by the orchestrator from what is reported here.
#[derive(Debug, Clone)]
pub struct GuardrailEngine {
    config: GuardrailConfig,
}

impl GuardrailEngine {
    /// Create an engine with the given configuration
    pub fn new(config: GuardrailConfig) -> Self {
        Self { config }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }

    /// Evaluate text in the given direction and report violations.
    ///
    /// Detection families run in a fixed order (PII, banned topics,
    /// toxicity, direction-specific checks) so the returned sequence is
    /// deterministic.
    pub fn evaluate(&self, text: &str, direction: Direction) -> Vec<Violation> {
        let mut violations = Vec::new();
        let text_lower = text.to_lowercase();

        if self.config.detect_pii {
            self.check_pii(text, direction, &mut violations);
        }

        if self.config.detect_banned_topics {
            self.check_banned_topics(&text_lower, &mut violations);
        }

        if self.config.detect_toxicity {
            self.check_toxicity(&text_lower, &mut violations);
        }

        match direction {
            Direction::Inbound => {
                if self.config.detect_prompt_injection {
                    self.check_prompt_injection(&text_lower, &mut violations);
                }
            }
            Direction::Outbound => {
                if self.config.detect_hallucination_risk {
                    self.check_hallucination_markers(&text_lower, &mut violations);
                }
            }
        }

        violations
    }

    /// Outbound grounding check: flag an answer whose best supporting
    /// evidence falls below the configured relevance threshold.
    pub fn evaluate_grounding(&self, best_relevance: Option<f32>) -> Option<Violation> {
        if !self.config.detect_hallucination_risk {
            return None;
        }

        let supported = best_relevance
            .map(|score| score >= self.config.relevance_threshold)
            .unwrap_or(false);

        if supported {
            return None;
        }

        Some(Violation::new(
            ViolationCategory::HallucinationRisk,
            Severity::Medium,
            format!(
                "Answer has no supporting evidence at or above relevance {:.2}",
                self.config.relevance_threshold
            ),
        ))
    }

    /// Replace every recognized PII span with a redacted rendering.
    ///
    /// Pure helper for the orchestrator's sanitization decision; the engine
    /// itself never applies it to pipeline text.
    pub fn redact_pii(&self, text: &str) -> String {
        let mut result = text.to_string();

        for (kind, pattern) in PII_PATTERNS.iter() {
            result = pattern
                .replace_all(&result, |caps: &regex::Captures<'_>| {
                    redact(*kind, caps.get(0).map(|m| m.as_str()).unwrap_or_default())
                })
                .into_owned();
        }

        result
    }

    fn check_pii(&self, text: &str, direction: Direction, violations: &mut Vec<Violation>) {
        for (kind, pattern) in PII_PATTERNS.iter() {
            for matched in pattern.find_iter(text) {
                // PII leaking outbound is always a blocker; inbound severity
                // depends on the identifier kind.
                let severity = match direction {
                    Direction::Inbound => kind.inbound_severity(),
                    Direction::Outbound => Severity::Critical,
                };

                violations.push(
                    Violation::new(
                        ViolationCategory::Pii,
                        severity,
                        format!("Detected {} in {} text", kind.label(), direction),
                    )
                    .with_matched_span(redact(*kind, matched.as_str())),
                );
            }
        }
    }

    fn check_banned_topics(&self, text_lower: &str, violations: &mut Vec<Violation>) {
        for topic in &self.config.banned_topics {
            if text_lower.contains(&topic.to_lowercase()) {
                violations.push(
                    Violation::new(
                        ViolationCategory::BannedTopic,
                        Severity::Medium,
                        format!("Detected banned topic '{}'", topic),
                    )
                    .with_matched_span(topic.clone()),
                );
            }
        }
    }

    fn check_toxicity(&self, text_lower: &str, violations: &mut Vec<Violation>) {
        for term in &self.config.toxicity_terms {
            if text_lower.contains(&term.to_lowercase()) {
                violations.push(Violation::new(
                    ViolationCategory::Toxicity,
                    Severity::High,
                    format!("Detected toxic content marker '{}'", term),
                ));
            }
        }
    }

    fn check_prompt_injection(&self, text_lower: &str, violations: &mut Vec<Violation>) {
        for phrase in INJECTION_PHRASES {
            if text_lower.contains(phrase) {
                violations.push(
                    Violation::new(
                        ViolationCategory::PromptInjection,
                        Severity::Critical,
                        "Potential prompt injection attempt",
                    )
                    .with_matched_span((*phrase).to_string()),
                );
            }
        }
    }

    fn check_hallucination_markers(&self, text_lower: &str, violations: &mut Vec<Violation>) {
        for marker in HALLUCINATION_MARKERS {
            if text_lower.contains(marker) {
                violations.push(Violation::new(
                    ViolationCategory::HallucinationRisk,
                    Severity::Medium,
                    format!("Answer contains ungrounded-response marker '{}'", marker),
                ));
            }
        }
    }
}

impl Default for GuardrailEngine {
    fn default() -> Self {
        Self::new(GuardrailConfig::default())
    }
}

/// Redacted rendering of a PII match: keep a short prefix of structured
/// identifiers, mask emails, replace everything else entirely.
fn redact(kind: PiiKind, matched: &str) -> String {
    match kind {
        PiiKind::Email => {
            let prefix: String = matched.chars().take(2).collect();
            format!("{}***@***", prefix)
        }
        PiiKind::AccountNumber | PiiKind::NationalId | PiiKind::Iban => {
            let prefix: String = matched.chars().take(4).collect();
            let masked = "*".repeat(matched.chars().count().saturating_sub(4));
            format!("{}{}", prefix, masked)
        }
        PiiKind::Passport | PiiKind::Phone => "[REDACTED]".to_string(),
    }
}
