//! In-memory trace and chat-history store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::audit::{ChatTurn, StageTrace, TraceStore};
use crate::domain::DomainError;

/// In-memory persistence collaborator for development without a database.
///
/// Traces and turns are grouped by session and kept in arrival order.
#[derive(Debug, Default)]
pub struct InMemoryTraceStore {
    traces: Arc<RwLock<HashMap<String, Vec<StageTrace>>>>,
    turns: Arc<RwLock<HashMap<String, Vec<ChatTurn>>>>,
}

impl InMemoryTraceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with recorded traces
    pub async fn session_count(&self) -> usize {
        self.traces.read().await.len()
    }
}

#[async_trait]
impl TraceStore for InMemoryTraceStore {
    async fn append_traces(
        &self,
        session_id: &str,
        traces: Vec<StageTrace>,
    ) -> Result<(), DomainError> {
        self.traces
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .extend(traces);

        Ok(())
    }

    async fn record_turn(&self, turn: ChatTurn) -> Result<(), DomainError> {
        self.turns
            .write()
            .await
            .entry(turn.session_id.clone())
            .or_default()
            .push(turn);

        Ok(())
    }

    async fn traces_for_session(&self, session_id: &str) -> Result<Vec<StageTrace>, DomainError> {
        Ok(self
            .traces
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn turns_for_session(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError> {
        Ok(self
            .turns
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskTier;
    use std::time::Duration;

    #[tokio::test]
    async fn test_append_and_read_traces() {
        let store = InMemoryTraceStore::new();

        store
            .append_traces(
                "session-1",
                vec![
                    StageTrace::success("received", Duration::ZERO),
                    StageTrace::success("sanitize_check", Duration::from_millis(1)),
                ],
            )
            .await
            .unwrap();

        store
            .append_traces(
                "session-1",
                vec![StageTrace::success("retrieve", Duration::from_millis(2))],
            )
            .await
            .unwrap();

        let traces = store.traces_for_session("session-1").await.unwrap();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[2].stage_name, "retrieve");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemoryTraceStore::new();

        store
            .append_traces("a", vec![StageTrace::success("received", Duration::ZERO)])
            .await
            .unwrap();

        let other = store.traces_for_session("b").await.unwrap();
        assert!(other.is_empty());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_record_and_read_turns() {
        let store = InMemoryTraceStore::new();

        store
            .record_turn(ChatTurn::new(
                "session-1",
                "msg-1",
                "question",
                "answer",
                RiskTier::Minimal,
                0.9,
            ))
            .await
            .unwrap();

        let turns = store.turns_for_session("session-1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].message_id, "msg-1");
    }
}
