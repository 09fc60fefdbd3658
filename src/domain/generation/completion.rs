//! Text-completion collaborator trait

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// User-facing prompt text
    pub prompt: String,
    /// Optional system instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the system instruction
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Model that produced the text, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionResponse {
    /// Create a new completion response
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    /// Set the reporting model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Trait for the opaque text-completion service.
///
/// Implementations may fail or time out; callers must treat every error as
/// recoverable and substitute their defined fallback.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Generate a completion for the request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::mock::MockCompletionProvider;
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("Explain model risk")
            .with_system("You are a risk assistant")
            .with_temperature(0.2)
            .with_max_tokens(500);

        assert_eq!(request.prompt, "Explain model risk");
        assert_eq!(request.system.as_deref(), Some("You are a risk assistant"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(500));
    }

    #[test]
    fn test_temperature_clamping() {
        let request = CompletionRequest::new("x").with_temperature(5.0);
        assert_eq!(request.temperature, Some(2.0));
    }

    #[tokio::test]
    async fn test_mock_response() {
        let provider = MockCompletionProvider::new().with_response("Generated answer");

        let response = provider
            .complete(CompletionRequest::new("prompt"))
            .await
            .unwrap();
        assert_eq!(response.text, "Generated answer");
    }

    #[tokio::test]
    async fn test_mock_error() {
        let provider = MockCompletionProvider::new().with_error("service down");

        let result = provider.complete(CompletionRequest::new("prompt")).await;
        assert!(result.is_err());
    }
}
