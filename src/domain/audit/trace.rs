//! Stage trace types

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Success,
    Failure,
    Skipped,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Audit record of one pipeline stage's execution.
///
/// One trace is written per stage actually scheduled, including skipped
/// stages and the terminal stage of an aborted run. The summary holds
/// scalar observability values only - lengths, counts, flags - never raw
/// query or answer text, so traces are safe to persist and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTrace {
    /// Name of the stage
    pub stage_name: String,
    /// Stage outcome
    pub status: StageStatus,
    /// Stage duration in milliseconds
    pub duration_ms: u64,
    /// Scalar key/value observability summary
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub output_summary: BTreeMap<String, serde_json::Value>,
    /// When the stage finished
    pub timestamp: DateTime<Utc>,
}

impl StageTrace {
    /// Create a new trace with the given status
    pub fn new(stage_name: impl Into<String>, status: StageStatus, duration: Duration) -> Self {
        Self {
            stage_name: stage_name.into(),
            status,
            duration_ms: duration.as_millis() as u64,
            output_summary: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a successful trace
    pub fn success(stage_name: impl Into<String>, duration: Duration) -> Self {
        Self::new(stage_name, StageStatus::Success, duration)
    }

    /// Create a failed trace
    pub fn failure(stage_name: impl Into<String>, duration: Duration) -> Self {
        Self::new(stage_name, StageStatus::Failure, duration)
    }

    /// Create a skipped trace
    pub fn skipped(stage_name: impl Into<String>) -> Self {
        Self::new(stage_name, StageStatus::Skipped, Duration::ZERO)
    }

    /// Add a scalar summary entry
    pub fn with_summary(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.output_summary.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_trace() {
        let trace = StageTrace::success("retrieve", Duration::from_millis(42))
            .with_summary("evidence_count", 3)
            .with_summary("degraded", false);

        assert_eq!(trace.stage_name, "retrieve");
        assert_eq!(trace.status, StageStatus::Success);
        assert_eq!(trace.duration_ms, 42);
        assert_eq!(
            trace.output_summary.get("evidence_count"),
            Some(&serde_json::json!(3))
        );
    }

    #[test]
    fn test_skipped_trace_has_zero_duration() {
        let trace = StageTrace::skipped("generate");

        assert_eq!(trace.status, StageStatus::Skipped);
        assert_eq!(trace.duration_ms, 0);
    }

    #[test]
    fn test_serialization() {
        let trace = StageTrace::failure("generate", Duration::from_millis(10))
            .with_summary("error", "completion timed out");

        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"failure\""));
        assert!(json.contains("completion timed out"));

        let parsed: StageTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, StageStatus::Failure);
    }

    #[test]
    fn test_empty_summary_is_omitted() {
        let trace = StageTrace::success("received", Duration::ZERO);
        let json = serde_json::to_string(&trace).unwrap();

        assert!(!json.contains("output_summary"));
    }
}
