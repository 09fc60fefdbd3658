//! Domain layer - Core business logic and entities

pub mod audit;
pub mod citation;
pub mod error;
pub mod generation;
pub mod guardrail;
pub mod pipeline;
pub mod retrieval;
pub mod risk;

pub use audit::{AuditRecorder, ChatTurn, StageStatus, StageTrace, TraceStore};
pub use citation::{Citation, CitationLinker};
pub use error::DomainError;
pub use generation::{
    AnswerGenerator, CompletionProvider, CompletionRequest, CompletionResponse, GeneratorConfig,
    NO_EVIDENCE_ANSWER, SERVICE_FALLBACK_ANSWER,
};
pub use guardrail::{
    Direction, GuardrailConfig, GuardrailEngine, Severity, Violation, ViolationCategory,
};
pub use pipeline::{
    OrchestratorConfig, PipelineOrchestrator, PipelineStage, PipelineState, QueryOptions,
    QueryOutcome, REFUSAL_ANSWER,
};
pub use retrieval::{Evidence, EvidenceRetriever, RetrieverConfig, SearchHit, SimilaritySearch};
pub use risk::{
    ClassificationContext, ClassifierConfig, RiskAssessment, RiskClassifier, RiskTier,
};
