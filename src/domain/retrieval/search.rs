//! Similarity-search collaborator trait

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A raw hit returned by the similarity-search service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identifier of the matched document
    pub document_id: String,
    /// Matched passage text
    pub excerpt: String,
    /// Section of the document, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Similarity score (0.0 - 1.0)
    pub score: f32,
    /// Document metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SearchHit {
    /// Create a new search hit
    pub fn new(document_id: impl Into<String>, excerpt: impl Into<String>, score: f32) -> Self {
        Self {
            document_id: document_id.into(),
            excerpt: excerpt.into(),
            section: None,
            score,
            metadata: HashMap::new(),
        }
    }

    /// Set the document section
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Trait for the opaque nearest-neighbor service backing retrieval.
///
/// Implementations must tolerate concurrent calls; the pipeline treats the
/// index snapshot as read-only for the lifetime of a request.
#[async_trait]
pub trait SimilaritySearch: Send + Sync + Debug {
    /// Search the index for the top `k` passages matching the query
    async fn search(&self, query: &str, k: u32) -> Result<Vec<SearchHit>, DomainError>;

    /// Total number of indexed passages
    async fn document_count(&self) -> Result<usize, DomainError>;

    /// Get the index implementation name
    fn index_name(&self) -> &'static str;
}
