//! Chat endpoint request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::audit::{ChatTurn, StageTrace};
use crate::domain::citation::Citation;
use crate::domain::guardrail::Violation;
use crate::domain::pipeline::QueryOutcome;
use crate::domain::risk::RiskTier;

/// Request body for `POST /v1/chat`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatQueryRequest {
    /// The user's question
    #[validate(length(min = 1, max = 4000, message = "message must be 1-4000 characters"))]
    pub message: String,
    /// Session identifier; a fresh one is generated when omitted
    #[validate(length(max = 100, message = "session_id must be at most 100 characters"))]
    #[serde(default)]
    pub session_id: Option<String>,
    /// When false, guardrail checkpoints are evaluated but never block
    #[serde(default = "default_true")]
    pub enable_guardrails: bool,
    /// When true, stage traces are included in the response
    #[serde(default)]
    pub return_traces: bool,
}

fn default_true() -> bool {
    true
}

/// Response body for `POST /v1/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQueryResponse {
    /// Unique identifier of this exchange
    pub message_id: String,
    /// Session the exchange belongs to
    pub session_id: String,
    /// The question as received
    pub question: String,
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
    pub traces: Option<Vec<StageTrace>>,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
    /// When the response was produced
    pub timestamp: DateTime<Utc>,
}

impl ChatQueryResponse {
    /// Build the response from a pipeline outcome
    pub fn from_outcome(outcome: QueryOutcome, session_id: &str, question: &str) -> Self {
        Self {
            message_id: outcome.message_id,
            session_id: session_id.to_string(),
            question: question.to_string(),
            answer: outcome.answer,
            risk_tier: outcome.risk_tier,
            confidence: outcome.confidence,
            citations: outcome.citations,
            violations: outcome.violations,
            traces: outcome.trace,
            processing_time_ms: outcome.processing_time_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Response body for `GET /v1/traces/{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTracesResponse {
    /// The requested session
    pub session_id: String,
    /// Stage traces recorded for the session, in execution order
    pub traces: Vec<StageTrace>,
    /// Chat turns recorded for the session
    pub turns: Vec<ChatTurn>,
}
