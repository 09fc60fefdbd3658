//! Risk tier classification

use serde::{Deserialize, Serialize};

/// Ordered risk tier for a response.
///
/// The derived ordering is load-bearing: escalation rules take the maximum
/// of several candidate tiers, so variants must stay declared from least to
/// most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Routine informational answer, no oversight required
    #[default]
    Minimal,
    /// Answer should be spot-checked (weak grounding or mildly sensitive topic)
    Limited,
    /// Answer requires human review before being acted on
    High,
    /// Answer must not be relied on without compliance sign-off
    Critical,
}

impl RiskTier {
    /// Escalate to the higher of two tiers
    pub fn escalate(self, other: RiskTier) -> RiskTier {
        self.max(other)
    }

    /// Check whether this tier is at least the given tier
    pub fn is_at_least(self, other: RiskTier) -> bool {
        self >= other
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minimal => write!(f, "minimal"),
            Self::Limited => write!(f, "limited"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}
