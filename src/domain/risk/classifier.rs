//! Risk classification over query, evidence, and violations

use serde::{Deserialize, Serialize};

use super::tier::RiskTier;
use crate::domain::guardrail::{Severity, Violation};
use crate::domain::retrieval::{coverage, Evidence};

/// Configuration for the risk classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Topics whose mention alone escalates the minimum tier to `high`
    #[serde(default = "default_high_sensitivity_topics")]
    pub high_sensitivity_topics: Vec<String>,
    /// Topics whose mention escalates the minimum tier to `limited`
    #[serde(default = "default_elevated_topics")]
    pub elevated_topics: Vec<String>,
    /// Minimum similarity for evidence to count toward coverage
    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: f32,
}

fn default_high_sensitivity_topics() -> Vec<String> {
    [
        "credit decision",
        "credit decisions",
        "regulatory capital",
        "protected attribute",
        "protected attributes",
        "breach",
        "penalty",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_elevated_topics() -> Vec<String> {
    ["compliance", "regulatory", "audit", "validation", "assessment"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_coverage_threshold() -> f32 {
    0.6
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            high_sensitivity_topics: default_high_sensitivity_topics(),
            elevated_topics: default_elevated_topics(),
            coverage_threshold: default_coverage_threshold(),
        }
    }
}

impl ClassifierConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the high-sensitivity topic list
    pub fn with_high_sensitivity_topics(mut self, topics: Vec<String>) -> Self {
        self.high_sensitivity_topics = topics;
        self
    }

    /// Replace the elevated topic list
    pub fn with_elevated_topics(mut self, topics: Vec<String>) -> Self {
        self.elevated_topics = topics;
        self
    }

    /// Set the coverage threshold
    pub fn with_coverage_threshold(mut self, threshold: f32) -> Self {
        self.coverage_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// Inputs to a classification pass
#[derive(Debug, Clone, Copy)]
pub struct ClassificationContext<'a> {
    /// The (sanitized) user query
    pub query: &'a str,
    /// Evidence retrieved so far
    pub evidence: &'a [Evidence],
    /// All violations recorded so far
    pub violations: &'a [Violation],
}

/// Result of a classification pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub confidence: f32,
}

/// Rule-based risk classifier.
///
/// The returned tier is the maximum of the topic-sensitivity tier, the tier
/// implied by the worst recorded violation, and the tier implied by weak
/// evidence coverage. Confidence decreases monotonically as violations
/// accumulate or worsen; the exact weights are an implementation choice,
/// the monotonicity is the contract.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    config: ClassifierConfig,
}

impl RiskClassifier {
    /// Create a classifier with the given configuration
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Get the classifier configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Tier implied by the query topic alone
    pub fn topic_tier(&self, query: &str) -> RiskTier {
        let query_lower = query.to_lowercase();

        if self
            .config
            .high_sensitivity_topics
            .iter()
            .any(|topic| query_lower.contains(&topic.to_lowercase()))
        {
            return RiskTier::High;
        }

        if self
            .config
            .elevated_topics
            .iter()
            .any(|topic| query_lower.contains(&topic.to_lowercase()))
        {
            return RiskTier::Limited;
        }

        RiskTier::Minimal
    }

    /// Classify the current pipeline context.
    ///
    /// Used both for the pre-generation pass (violations from the inbound
    /// check, evidence from retrieval) and the final pass (all violations,
    /// including outbound findings).
    pub fn classify(&self, ctx: &ClassificationContext<'_>) -> RiskAssessment {
        let topic = self.topic_tier(ctx.query);
        let violation_tier = ctx
            .violations
            .iter()
            .map(Violation::implied_tier)
            .max()
            .unwrap_or(RiskTier::Minimal);
        let coverage_tier = self.coverage_tier(ctx.evidence);

        let tier = topic.escalate(violation_tier).escalate(coverage_tier);

        RiskAssessment {
            tier,
            confidence: self.confidence(ctx),
        }
    }

    /// Ungrounded answers are flagged: no evidence at or above the coverage
    /// threshold escalates to at least `limited`.
    fn coverage_tier(&self, evidence: &[Evidence]) -> RiskTier {
        let supported = evidence
            .iter()
            .any(|e| e.similarity_score >= self.config.coverage_threshold);

        if supported {
            RiskTier::Minimal
        } else {
            RiskTier::Limited
        }
    }

    fn confidence(&self, ctx: &ClassificationContext<'_>) -> f32 {
        let coverage = coverage(ctx.evidence, self.config.coverage_threshold);
        let base = 0.3 + 0.6 * coverage;

        let penalty: f32 = ctx
            .violations
            .iter()
            .map(|v| match v.severity {
                Severity::Low => 0.95,
                Severity::Medium => 0.85,
                Severity::High => 0.7,
                Severity::Critical => 0.5,
            })
            .product();

        (base * penalty).clamp(0.0, 1.0)
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::guardrail::ViolationCategory;

    fn violation(severity: Severity) -> Violation {
        Violation::new(ViolationCategory::BannedTopic, severity, "test violation")
    }

    fn ctx<'a>(
        query: &'a str,
        evidence: &'a [Evidence],
        violations: &'a [Violation],
    ) -> ClassificationContext<'a> {
        ClassificationContext {
            query,
            evidence,
            violations,
        }
    }

    #[test]
    fn test_topic_tier() {
        let classifier = RiskClassifier::default();

        assert_eq!(classifier.topic_tier("What is model risk?"), RiskTier::Minimal);
        assert_eq!(
            classifier.topic_tier("What does the audit require?"),
            RiskTier::Limited
        );
        assert_eq!(
            classifier.topic_tier("Can we automate credit decisions?"),
            RiskTier::High
        );
    }

    #[test]
    fn test_grounded_clean_query_is_minimal() {
        let classifier = RiskClassifier::default();
        let evidence = vec![Evidence::new("model_risk_policy", "Passage", 0.91)];

        let assessment = classifier.classify(&ctx("What is model risk?", &evidence, &[]));

        assert_eq!(assessment.tier, RiskTier::Minimal);
        assert!(assessment.confidence > 0.8);
    }

    #[test]
    fn test_no_evidence_escalates_to_limited() {
        let classifier = RiskClassifier::default();

        let assessment = classifier.classify(&ctx("What is model risk?", &[], &[]));

        assert_eq!(assessment.tier, RiskTier::Limited);
        assert!(assessment.confidence < 0.5);
    }

    #[test]
    fn test_low_scoring_evidence_escalates_to_limited() {
        let classifier = RiskClassifier::default();
        let evidence = vec![Evidence::new("doc", "Weak match", 0.3)];

        let assessment = classifier.classify(&ctx("What is model risk?", &evidence, &[]));

        assert_eq!(assessment.tier, RiskTier::Limited);
    }

    #[test]
    fn test_violation_severity_implies_tier() {
        let classifier = RiskClassifier::default();
        let evidence = vec![Evidence::new("doc", "Passage", 0.9)];

        let medium = [violation(Severity::Medium)];
        let assessment = classifier.classify(&ctx("hello", &evidence, &medium));
        assert_eq!(assessment.tier, RiskTier::Limited);

        let high = [violation(Severity::High)];
        let assessment = classifier.classify(&ctx("hello", &evidence, &high));
        assert_eq!(assessment.tier, RiskTier::High);

        let critical = [violation(Severity::Critical)];
        let assessment = classifier.classify(&ctx("hello", &evidence, &critical));
        assert_eq!(assessment.tier, RiskTier::Critical);
    }

    #[test]
    fn test_tier_is_maximum_of_escalation_sources() {
        let classifier = RiskClassifier::default();

        // Topic says high, violations say limited, coverage says limited:
        // high wins.
        let medium = [violation(Severity::Medium)];
        let assessment = classifier.classify(&ctx(
            "Explain our regulatory capital requirements",
            &[],
            &medium,
        ));
        assert_eq!(assessment.tier, RiskTier::High);
    }

    #[test]
    fn test_adding_critical_violation_never_decreases_tier() {
        let classifier = RiskClassifier::default();
        let evidence = vec![Evidence::new("doc", "Passage", 0.9)];

        for base_violations in [
            vec![],
            vec![violation(Severity::Low)],
            vec![violation(Severity::High)],
        ] {
            let before = classifier
                .classify(&ctx("hello", &evidence, &base_violations))
                .tier;

            let mut with_critical = base_violations.clone();
            with_critical.push(violation(Severity::Critical));
            let after = classifier
                .classify(&ctx("hello", &evidence, &with_critical))
                .tier;

            assert!(after >= before);
        }
    }

    #[test]
    fn test_confidence_decreases_with_violations() {
        let classifier = RiskClassifier::default();
        let evidence = vec![Evidence::new("doc", "Passage", 0.9)];

        let none = classifier.classify(&ctx("hello", &evidence, &[])).confidence;

        let one_medium = [violation(Severity::Medium)];
        let with_medium = classifier
            .classify(&ctx("hello", &evidence, &one_medium))
            .confidence;

        let two = [violation(Severity::Medium), violation(Severity::Medium)];
        let with_two = classifier.classify(&ctx("hello", &evidence, &two)).confidence;

        let critical = [violation(Severity::Critical)];
        let with_critical = classifier
            .classify(&ctx("hello", &evidence, &critical))
            .confidence;

        assert!(with_medium < none);
        assert!(with_two < with_medium);
        assert!(with_critical < with_medium);
    }

    #[test]
    fn test_confidence_increases_with_coverage() {
        let classifier = RiskClassifier::default();

        let weak = vec![Evidence::new("a", "x", 0.3)];
        let strong = vec![Evidence::new("a", "x", 0.9), Evidence::new("b", "y", 0.8)];

        let weak_confidence = classifier.classify(&ctx("hello", &weak, &[])).confidence;
        let strong_confidence = classifier.classify(&ctx("hello", &strong, &[])).confidence;

        assert!(strong_confidence > weak_confidence);
    }

    #[test]
    fn test_confidence_stays_in_bounds() {
        let classifier = RiskClassifier::default();

        let violations: Vec<Violation> =
            (0..20).map(|_| violation(Severity::Critical)).collect();
        let assessment = classifier.classify(&ctx("hello", &[], &violations));

        assert!((0.0..=1.0).contains(&assessment.confidence));
    }
}
