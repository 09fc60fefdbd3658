use serde::Deserialize;

use crate::domain::guardrail::{GuardrailConfig, Severity};
use crate::domain::risk::ClassifierConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub guardrails: GuardrailConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which completion backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionBackend {
    /// OpenAI-compatible HTTP endpoint
    Openai,
    /// Deterministic local stub (no network)
    #[default]
    Stub,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Completion backend selection
    #[serde(default)]
    pub backend: CompletionBackend,
    /// Model identifier passed to the backend
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL override for OpenAI-compatible gateways
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Completion call timeout, in seconds
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum evidence passages per query
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Minimum similarity for retrieved evidence
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    /// Minimum relevance for an evidence item to be cited
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    /// Violations at or above this severity abort the pipeline
    #[serde(default = "default_blocking_severity")]
    pub blocking_severity: Severity,
    /// Maximum accepted query length in characters
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
    /// Similarity-search timeout, in seconds
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,
    /// Optional JSON snapshot to load the policy index from
    #[serde(default)]
    pub index_snapshot_path: Option<String>,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_completion_timeout() -> u64 {
    30
}

fn default_top_k() -> u32 {
    5
}

fn default_min_similarity() -> f32 {
    0.25
}

fn default_relevance_threshold() -> f32 {
    0.6
}

fn default_blocking_severity() -> Severity {
    Severity::Critical
}

fn default_max_query_chars() -> usize {
    4000
}

fn default_search_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: CompletionBackend::default(),
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            relevance_threshold: default_relevance_threshold(),
            blocking_severity: default_blocking_severity(),
            max_query_chars: default_max_query_chars(),
            search_timeout_secs: default_search_timeout(),
            index_snapshot_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pipeline.top_k, 5);
        assert_eq!(config.pipeline.blocking_severity, Severity::Critical);
        assert_eq!(config.llm.backend, CompletionBackend::Stub);
        assert!(config.guardrails.detect_pii);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let parsed: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                host = "127.0.0.1"
                port = 9000

                [pipeline]
                top_k = 3
                blocking_severity = "high"

                [llm]
                backend = "openai"
                model = "gpt-4-turbo"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.pipeline.top_k, 3);
        assert_eq!(parsed.pipeline.blocking_severity, Severity::High);
        assert_eq!(parsed.llm.backend, CompletionBackend::Openai);
        assert_eq!(parsed.llm.model, "gpt-4-turbo");
        // Untouched sections keep defaults.
        assert_eq!(parsed.pipeline.max_query_chars, 4000);
    }
}
