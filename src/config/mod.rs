//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CompletionBackend, LlmConfig, LogFormat, LoggingConfig, PipelineConfig,
    ServerConfig,
};
