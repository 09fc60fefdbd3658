//! Evidence retriever - ranked, threshold-filtered retrieval over the policy index

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::evidence::Evidence;
use super::search::SimilaritySearch;
use crate::domain::DomainError;

/// Configuration for evidence retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Maximum evidence items to return
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Results scoring below this are discarded before truncation
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    /// Timeout for the similarity-search call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_top_k() -> u32 {
    5
}

fn default_min_similarity() -> f32 {
    0.25
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetrieverConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of evidence items
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity threshold
    pub fn with_min_similarity(mut self, threshold: f32) -> Self {
        self.min_similarity = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the search timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Retrieves grounding evidence from the similarity-search collaborator.
///
/// Results are filtered against `min_similarity` before truncation so that
/// a low-relevance passage can never displace nothing - an empty result is
/// preferable to weak grounding. Deterministic given a fixed index snapshot.
#[derive(Debug, Clone)]
pub struct EvidenceRetriever {
    index: Arc<dyn SimilaritySearch>,
    config: RetrieverConfig,
}

impl EvidenceRetriever {
    /// Create a new retriever over the given index
    pub fn new(index: Arc<dyn SimilaritySearch>, config: RetrieverConfig) -> Self {
        Self { index, config }
    }

    /// Get the retriever configuration
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Retrieve evidence for a query, ordered by descending similarity.
    ///
    /// An empty index result is an empty evidence list, not an error.
    /// Search outages and timeouts surface as errors for the orchestrator's
    /// fallback handling.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Evidence>, DomainError> {
        // Fetch beyond top_k so threshold filtering happens before truncation.
        let fetch_k = self.config.top_k.saturating_mul(2);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let hits = tokio::time::timeout(timeout, self.index.search(query, fetch_k))
            .await
            .map_err(|_| {
                DomainError::provider(
                    self.index.index_name(),
                    format!("similarity search timed out after {:?}", timeout),
                )
            })??;

        let mut evidence: Vec<Evidence> = hits
            .into_iter()
            .filter(|hit| hit.score >= self.config.min_similarity)
            .map(|hit| {
                let mut item = Evidence::new(hit.document_id, hit.excerpt, hit.score);
                if let Some(section) = hit.section {
                    item = item.with_section(section);
                }
                item.source_metadata = hit.metadata;
                item
            })
            .collect();

        evidence.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        evidence.truncate(self.config.top_k as usize);

        debug!(
            count = evidence.len(),
            top_k = self.config.top_k,
            "Retrieved evidence"
        );

        Ok(evidence)
    }
}
