//! Pipeline state model

use serde::{Deserialize, Serialize};

use crate::domain::audit::{AuditRecorder, StageTrace};
use crate::domain::citation::Citation;
use crate::domain::guardrail::Violation;
use crate::domain::retrieval::Evidence;
use crate::domain::risk::RiskTier;

/// The stages a request passes through, in order.
///
/// Tagged variants rather than polymorphic stage objects: the orchestrator
/// dispatches on the variant, so adding a stage means adding a variant and
/// one dispatch arm without touching existing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    SanitizeCheck,
    Retrieve,
    PreClassify,
    Generate,
    OutboundCheck,
    Cite,
    FinalClassify,
    Complete,
    Aborted,
}

impl PipelineStage {
    /// Stage name used in traces
    pub fn name(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::SanitizeCheck => "sanitize_check",
            Self::Retrieve => "retrieve",
            Self::PreClassify => "pre_classify",
            Self::Generate => "generate",
            Self::OutboundCheck => "outbound_check",
            Self::Cite => "cite",
            Self::FinalClassify => "final_classify",
            Self::Complete => "complete",
            Self::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-request processing options
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryOptions {
    /// When false, guardrail checkpoints are evaluated but never block
    #[serde(default = "default_true")]
    pub enable_guardrails: bool,
    /// When true, the stage traces are included in the response
    #[serde(default)]
    pub return_traces: bool,
}

fn default_true() -> bool {
    true
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enable_guardrails: true,
            return_traces: false,
        }
    }
}

impl QueryOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle guardrail blocking
    pub fn with_enable_guardrails(mut self, enabled: bool) -> Self {
        self.enable_guardrails = enabled;
        self
    }

    /// Toggle trace inclusion in the response
    pub fn with_return_traces(mut self, enabled: bool) -> Self {
        self.return_traces = enabled;
        self
    }
}

/// Mutable state threaded through the pipeline stages.
///
/// Created once per request and exclusively owned by the orchestrator for
/// the request's lifetime, so concurrent requests are isolated by
/// construction. The violation list is append-only: detections can be
/// added but never removed or rewritten before the audit record is flushed.
#[derive(Debug)]
pub struct PipelineState {
    /// Session the request belongs to
    pub session_id: String,
    /// Original user text
    pub query: String,
    /// Query after any redaction decided at the inbound checkpoint
    pub sanitized_query: Option<String>,
    /// Evidence produced by the retrieve stage, ranked by similarity
    pub retrieved_evidence: Vec<Evidence>,
    /// Draft answer from the generate stage
    pub draft_answer: Option<String>,
    /// Final answer, set only once the cite stage (or abort path) runs
    pub final_answer: Option<String>,
    /// Citations attached by the cite stage, deduplicated by document
    pub citations: Vec<Citation>,
    /// Current risk tier; only ever escalated
    pub risk_tier: RiskTier,
    /// Confidence in the response (0.0 - 1.0)
    pub confidence: f32,
    /// Whether the pipeline aborted at a guardrail checkpoint
    pub aborted: bool,
    violations: Vec<Violation>,
    recorder: AuditRecorder,
}

impl PipelineState {
    /// Create fresh state for a request
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            sanitized_query: None,
            retrieved_evidence: Vec::new(),
            draft_answer: None,
            final_answer: None,
            citations: Vec::new(),
            risk_tier: RiskTier::Minimal,
            confidence: 0.0,
            aborted: false,
            violations: Vec::new(),
            recorder: AuditRecorder::new(),
        }
    }

    /// The query downstream stages should operate on
    pub fn effective_query(&self) -> &str {
        self.sanitized_query.as_deref().unwrap_or(&self.query)
    }

    /// Append detected violations
    pub fn record_violations(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    /// All violations recorded so far, in detection order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Escalate the risk tier; the tier never goes back down
    pub fn escalate_tier(&mut self, tier: RiskTier) {
        self.risk_tier = self.risk_tier.escalate(tier);
    }

    /// Record a stage trace
    pub fn record_trace(&mut self, trace: StageTrace) {
        self.recorder.record(trace);
    }

    /// The stage traces recorded so far
    pub fn stage_traces(&self) -> &[StageTrace] {
        self.recorder.traces()
    }

    /// Number of stages traced so far
    pub fn trace_count(&self) -> usize {
        self.recorder.len()
    }
}

/// Result of a pipeline invocation, shaped for the calling layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Unique identifier of this exchange
    pub message_id: String,
    /// The answer (generated, canned fallback, or refusal)
    pub answer: String,
    /// Final risk tier
    pub risk_tier: RiskTier,
    /// Final confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Citations backing the answer
    pub citations: Vec<Citation>,
    /// Violations recorded during processing
    pub violations: Vec<Violation>,
    /// Stage traces, present only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<StageTrace>>,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
    /// Whether the pipeline aborted at a guardrail checkpoint
    pub aborted: bool,
}
