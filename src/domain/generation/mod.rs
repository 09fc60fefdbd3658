//! Answer generation over the text-completion collaborator

pub mod completion;
pub mod generator;

pub use completion::{CompletionProvider, CompletionRequest, CompletionResponse};
pub use generator::{
    AnswerGenerator, GeneratorConfig, NO_EVIDENCE_ANSWER, SERVICE_FALLBACK_ANSWER,
};
