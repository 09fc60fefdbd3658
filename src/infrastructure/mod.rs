//! Infrastructure layer - Implementations of domain collaborator traits

pub mod audit;
pub mod index;
pub mod ingestion;
pub mod llm;
pub mod logging;

pub use audit::InMemoryTraceStore;
pub use index::{InMemoryPolicyIndex, IndexedDocument};
pub use llm::{HttpClient, OpenAiCompletionProvider, StubCompletionProvider};
