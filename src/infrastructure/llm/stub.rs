//! Deterministic stub completion provider

use async_trait::async_trait;

use crate::domain::generation::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::domain::DomainError;

/// Completion provider that answers without any external service.
///
/// Lets the full pipeline run in development and CI: the response is a
/// deterministic function of the prompt, summarizing the grounding excerpts
/// the generator included.
#[derive(Debug, Clone, Default)]
pub struct StubCompletionProvider;

impl StubCompletionProvider {
    /// Create a new stub provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CompletionProvider for StubCompletionProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, DomainError> {
        let source_count = request
            .prompt
            .lines()
            .filter(|line| line.starts_with("[Source:"))
            .count();

        let question = request
            .prompt
            .lines()
            .find_map(|line| line.strip_prefix("Question: "))
            .unwrap_or("your question");

        let text = format!(
            "[Stub answer] Based on {} policy excerpt(s), here is what the documents indicate \
             regarding \"{}\": the cited passages below contain the applicable requirements; \
             review them for the authoritative wording.",
            source_count, question
        );

        Ok(CompletionResponse::new(text).with_model("stub"))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_is_deterministic() {
        let provider = StubCompletionProvider::new();
        let prompt = "Policy excerpts:\n[Source: model_risk_policy]\nModel risk is ...\n\n\
                      Question: What is model risk?\n\nAnswer:";

        let first = provider
            .complete(CompletionRequest::new(prompt))
            .await
            .unwrap();
        let second = provider
            .complete(CompletionRequest::new(prompt))
            .await
            .unwrap();

        assert_eq!(first.text, second.text);
        assert!(first.text.contains("1 policy excerpt(s)"));
        assert!(first.text.contains("What is model risk?"));
    }

    #[tokio::test]
    async fn test_stub_labels_itself() {
        let provider = StubCompletionProvider::new();

        let response = provider
            .complete(CompletionRequest::new("Question: anything"))
            .await
            .unwrap();

        assert!(response.text.starts_with("[Stub answer]"));
        assert_eq!(response.model.as_deref(), Some("stub"));
    }
}
