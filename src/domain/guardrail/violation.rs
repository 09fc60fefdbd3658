//! Guardrail violation types

use serde::{Deserialize, Serialize};

use crate::domain::risk::RiskTier;

/// Category of a detected guardrail violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// Personally identifiable information (account numbers, national IDs, emails)
    Pii,
    /// Toxic or abusive content
    Toxicity,
    /// Topic on the configured denylist
    BannedTopic,
    /// Answer asserts facts without supporting evidence
    HallucinationRisk,
    /// Attempt to override system instructions
    PromptInjection,
}

impl std::fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pii => write!(f, "pii"),
            Self::Toxicity => write!(f, "toxicity"),
            Self::BannedTopic => write!(f, "banned_topic"),
            Self::HallucinationRisk => write!(f, "hallucination_risk"),
            Self::PromptInjection => write!(f, "prompt_injection"),
        }
    }
}

/// Ordered severity of a violation.
///
/// Like `RiskTier`, the declared order drives comparisons against the
/// configured blocking threshold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// The minimum risk tier implied by a violation of this severity
    pub fn implied_tier(self) -> RiskTier {
        match self {
            Self::Low => RiskTier::Minimal,
            Self::Medium => RiskTier::Limited,
            Self::High => RiskTier::High,
            Self::Critical => RiskTier::Critical,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A single detected violation.
///
/// Violations are immutable once constructed and only ever appended to the
/// pipeline state, so nothing detected can be lost before the audit record
/// is written. `matched_span` carries a redacted rendering of the offending
/// text - never the raw match - so violations are safe to serialize and log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub category: ViolationCategory,
    pub severity: Severity,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_span: Option<String>,
}

impl Violation {
    /// Create a new violation
    pub fn new(
        category: ViolationCategory,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            matched_span: None,
        }
    }

    /// Attach a redacted rendering of the matched text
    pub fn with_matched_span(mut self, span: impl Into<String>) -> Self {
        self.matched_span = Some(span.into());
        self
    }

    /// The minimum risk tier implied by this violation
    pub fn implied_tier(&self) -> RiskTier {
        self.severity.implied_tier()
    }
}

/// The highest severity among a set of violations, if any
pub fn max_severity(violations: &[Violation]) -> Option<Severity> {
    violations.iter().map(|v| v.severity).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_implied_tier() {
        assert_eq!(Severity::Low.implied_tier(), RiskTier::Minimal);
        assert_eq!(Severity::Medium.implied_tier(), RiskTier::Limited);
        assert_eq!(Severity::High.implied_tier(), RiskTier::High);
        assert_eq!(Severity::Critical.implied_tier(), RiskTier::Critical);
    }

    #[test]
    fn test_violation_builder() {
        let violation = Violation::new(
            ViolationCategory::Pii,
            Severity::Critical,
            "Detected account number in input",
        )
        .with_matched_span("4111********");

        assert_eq!(violation.category, ViolationCategory::Pii);
        assert_eq!(violation.severity, Severity::Critical);
        assert_eq!(violation.matched_span.as_deref(), Some("4111********"));
        assert_eq!(violation.implied_tier(), RiskTier::Critical);
    }

    #[test]
    fn test_max_severity() {
        assert_eq!(max_severity(&[]), None);

        let violations = vec![
            Violation::new(ViolationCategory::BannedTopic, Severity::Medium, "a"),
            Violation::new(ViolationCategory::Toxicity, Severity::High, "b"),
            Violation::new(ViolationCategory::Pii, Severity::Low, "c"),
        ];
        assert_eq!(max_severity(&violations), Some(Severity::High));
    }

    #[test]
    fn test_serialization() {
        let violation = Violation::new(
            ViolationCategory::PromptInjection,
            Severity::Critical,
            "Instruction override attempt",
        );

        let json = serde_json::to_string(&violation).unwrap();
        assert!(json.contains("\"prompt_injection\""));
        assert!(json.contains("\"critical\""));
        assert!(!json.contains("matched_span"));
    }
}
