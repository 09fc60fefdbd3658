//! Persistence collaborator for traces and chat history

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::trace::StageTrace;
use crate::domain::risk::RiskTier;
use crate::domain::DomainError;

/// One completed question/answer exchange, doubling as the pipeline's final
/// decision record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Session the turn belongs to
    pub session_id: String,
    /// Unique identifier of this turn
    pub message_id: String,
    /// The user's question
    pub question: String,
    /// The answer returned to the user
    pub answer: String,
    /// Final risk tier of the response
    pub risk_tier: RiskTier,
    /// Final confidence of the response
    pub confidence: f32,
    /// Number of violations recorded during processing
    pub violation_count: usize,
    /// Whether the pipeline aborted at a guardrail checkpoint
    pub aborted: bool,
    /// When the turn completed
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a new chat turn
    pub fn new(
        session_id: impl Into<String>,
        message_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        risk_tier: RiskTier,
        confidence: f32,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            message_id: message_id.into(),
            question: question.into(),
            answer: answer.into(),
            risk_tier,
            confidence,
            violation_count: 0,
            aborted: false,
            timestamp: Utc::now(),
        }
    }

    /// Set the violation count
    pub fn with_violation_count(mut self, count: usize) -> Self {
        self.violation_count = count;
        self
    }

    /// Mark the turn as aborted
    pub fn with_aborted(mut self, aborted: bool) -> Self {
        self.aborted = aborted;
        self
    }
}

/// Trait for the storage collaborator accepting finalized traces and chat
/// turns.
///
/// The pipeline only produces these records; the storage schema is the
/// collaborator's concern.
#[async_trait]
pub trait TraceStore: Send + Sync + Debug {
    /// Append the finalized stage traces for a request
    async fn append_traces(
        &self,
        session_id: &str,
        traces: Vec<StageTrace>,
    ) -> Result<(), DomainError>;

    /// Record a completed chat turn
    async fn record_turn(&self, turn: ChatTurn) -> Result<(), DomainError>;

    /// Retrieve all traces recorded for a session
    async fn traces_for_session(&self, session_id: &str) -> Result<Vec<StageTrace>, DomainError>;

    /// Retrieve all chat turns for a session
    async fn turns_for_session(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_turn_builder() {
        let turn = ChatTurn::new(
            "session-1",
            "msg-1",
            "What is model risk?",
            "Model risk is ...",
            RiskTier::Minimal,
            0.9,
        )
        .with_violation_count(2)
        .with_aborted(false);

        assert_eq!(turn.session_id, "session-1");
        assert_eq!(turn.violation_count, 2);
        assert!(!turn.aborted);
    }

    #[test]
    fn test_chat_turn_serialization() {
        let turn = ChatTurn::new("s", "m", "q", "a", RiskTier::High, 0.4).with_aborted(true);

        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"high\""));
        assert!(json.contains("\"aborted\":true"));
    }
}
