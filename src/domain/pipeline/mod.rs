//! Pipeline orchestration and per-request state

pub mod orchestrator;
pub mod state;

pub use orchestrator::{OrchestratorConfig, PipelineOrchestrator, REFUSAL_ANSWER};
pub use state::{PipelineStage, PipelineState, QueryOptions, QueryOutcome};
