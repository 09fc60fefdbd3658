//! Shared application state

use std::sync::Arc;

use crate::domain::audit::TraceStore;
use crate::domain::pipeline::PipelineOrchestrator;
use crate::domain::retrieval::SimilaritySearch;

/// State shared across request handlers.
///
/// Everything here is read-only or internally synchronized; per-request
/// mutable state lives inside the orchestrator's pipeline invocation.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The query pipeline
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Trace/chat persistence collaborator
    pub trace_store: Arc<dyn TraceStore>,
    /// Policy index (exposed for readiness checks)
    pub index: Arc<dyn SimilaritySearch>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        orchestrator: Arc<PipelineOrchestrator>,
        trace_store: Arc<dyn TraceStore>,
        index: Arc<dyn SimilaritySearch>,
    ) -> Self {
        Self {
            orchestrator,
            trace_store,
            index,
        }
    }
}
