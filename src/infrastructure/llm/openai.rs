//! OpenAI-compatible completion provider

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::generation::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Completion provider speaking the OpenAI chat-completions protocol.
///
/// Also covers OpenAI-compatible gateways via a custom base URL.
#[derive(Debug)]
pub struct OpenAiCompletionProvider {
    http: Arc<dyn HttpClientTrait>,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompletionProvider {
    /// Create a provider against the default OpenAI endpoint
    pub fn new(http: Arc<dyn HttpClientTrait>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Override the base URL (for compatible gateways)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut messages = Vec::new();

        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }

    fn parse_response(&self, response: serde_json::Value) -> Result<CompletionResponse, DomainError> {
        let text = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                DomainError::provider("openai", "Response missing choices[0].message.content")
            })?
            .to_string();

        let mut result = CompletionResponse::new(text);
        if let Some(model) = response["model"].as_str() {
            result = result.with_model(model);
        }

        Ok(result)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, DomainError> {
        let url = self.completions_url();
        let body = self.build_body(&request);

        debug!(model = %self.model, "Sending completion request");

        let auth_header = format!("Bearer {}", self.api_key);
        let headers = vec![
            ("Authorization", auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self.http.post_json(&url, headers, &body).await?;
        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
