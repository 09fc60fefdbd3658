//! Risk Copilot API
//!
//! Grounded question answering over risk and compliance policy documents:
//! - Multi-stage pipeline with per-stage audit traces
//! - Inbound/outbound guardrail checkpoints (PII, banned topics, injection)
//! - Evidence retrieval with similarity-threshold filtering
//! - Rule-based risk tiering and confidence scoring
//! - Citation attachment deduplicated by source document

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::CompletionBackend;
use domain::citation::CitationLinker;
use domain::generation::{AnswerGenerator, CompletionProvider, GeneratorConfig};
use domain::guardrail::GuardrailEngine;
use domain::pipeline::{OrchestratorConfig, PipelineOrchestrator};
use domain::retrieval::{EvidenceRetriever, RetrieverConfig, SimilaritySearch};
use infrastructure::audit::InMemoryTraceStore;
use infrastructure::index::{InMemoryPolicyIndex, IndexedDocument};
use infrastructure::llm::{HttpClient, OpenAiCompletionProvider, StubCompletionProvider};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let index = create_policy_index(config)?;
    let completion = create_completion_provider(config);
    let store = Arc::new(InMemoryTraceStore::new());

    let retriever_config = RetrieverConfig::new()
        .with_top_k(config.pipeline.top_k)
        .with_min_similarity(config.pipeline.min_similarity)
        .with_timeout_secs(config.pipeline.search_timeout_secs);

    let generator_config = GeneratorConfig::new()
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens)
        .with_timeout_secs(config.llm.timeout_secs);

    let orchestrator_config = OrchestratorConfig::new()
        .with_blocking_severity(config.pipeline.blocking_severity)
        .with_max_query_chars(config.pipeline.max_query_chars);

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        Arc::new(GuardrailEngine::new(config.guardrails.clone())),
        EvidenceRetriever::new(index.clone(), retriever_config),
        domain::risk::RiskClassifier::new(config.classifier.clone()),
        AnswerGenerator::new(completion, generator_config),
        CitationLinker::new(config.pipeline.relevance_threshold),
        store.clone(),
        orchestrator_config,
    ));

    Ok(AppState::new(orchestrator, store, index))
}

fn create_policy_index(config: &AppConfig) -> anyhow::Result<Arc<dyn SimilaritySearch>> {
    if let Some(path) = &config.pipeline.index_snapshot_path {
        if std::path::Path::new(path).exists() {
            let index = InMemoryPolicyIndex::load_snapshot(path)?;
            info!(path = %path, "Loaded policy index snapshot");
            return Ok(Arc::new(index));
        }

        info!(path = %path, "Index snapshot not found, seeding default policy corpus");
    }

    Ok(Arc::new(InMemoryPolicyIndex::with_documents(
        default_policy_documents(),
    )))
}

fn create_completion_provider(config: &AppConfig) -> Arc<dyn CompletionProvider> {
    match config.llm.backend {
        CompletionBackend::Openai => {
            let api_key =
                std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "sk-placeholder".to_string());
            let http = Arc::new(HttpClient::with_timeout(std::time::Duration::from_secs(
                config.llm.timeout_secs,
            )));

            let mut provider =
                OpenAiCompletionProvider::new(http, api_key, config.llm.model.clone());
            if let Some(base_url) = &config.llm.base_url {
                info!(base_url = %base_url, "Using OpenAI-compatible gateway");
                provider = provider.with_base_url(base_url);
            } else {
                info!("Using OpenAI provider with default base URL");
            }

            Arc::new(provider)
        }
        CompletionBackend::Stub => {
            info!("Using deterministic stub completion provider");
            Arc::new(StubCompletionProvider::new())
        }
    }
}

// ============================================================================
// Default Policy Corpus
// ============================================================================

fn default_policy_documents() -> Vec<IndexedDocument> {
    vec![
        IndexedDocument::new(
            "model_risk_management_policy",
            "Model risk is the potential for adverse consequences from decisions based on \
             incorrect or misused model outputs. Sources include fundamental errors in \
             methodology, implementation mistakes, use outside the intended purpose, and \
             degraded input data quality.",
        )
        .with_section("1. Definition")
        .with_metadata("category", serde_json::json!("model_risk")),
        IndexedDocument::new(
            "model_risk_management_policy",
            "Every production model must pass independent validation before deployment and be \
             revalidated annually. Validation covers conceptual soundness, ongoing monitoring, \
             and outcomes analysis against realized results.",
        )
        .with_section("3. Validation Requirements")
        .with_metadata("category", serde_json::json!("model_risk")),
        IndexedDocument::new(
            "ai_governance_policy",
            "AI systems must be transparent and explainable in proportion to their impact. \
             Automated decisions affecting customers require human oversight, documented \
             fairness testing, and a designated accountable owner.",
        )
        .with_section("2. Principles")
        .with_metadata("category", serde_json::json!("ai_governance")),
        IndexedDocument::new(
            "ai_governance_policy",
            "Large language model deployments must restrict generated output to grounded \
             sources, log every prompt and response for audit, and escalate hallucination \
             incidents to the AI risk committee within five business days.",
        )
        .with_section("5. Generative AI")
        .with_metadata("category", serde_json::json!("ai_governance")),
        IndexedDocument::new(
            "operational_risk_framework",
            "Operational risk events, including system outages and processing errors, must be \
             recorded in the incident register within two business days with an assessment of \
             financial and reputational impact.",
        )
        .with_section("4. Incident Reporting")
        .with_metadata("category", serde_json::json!("operational_risk")),
        IndexedDocument::new(
            "regulatory_compliance_handbook",
            "Regulatory capital calculations follow the standardized approach unless internal \
             model approval has been granted. Changes to approved models require prior \
             notification to the supervisor.",
        )
        .with_section("7. Capital Requirements")
        .with_metadata("category", serde_json::json!("compliance")),
    ]
}
