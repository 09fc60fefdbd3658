//! Completion provider implementations

pub mod http_client;
pub mod openai;
pub mod stub;

pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::OpenAiCompletionProvider;
pub use stub::StubCompletionProvider;
