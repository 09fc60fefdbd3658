//! Evidence entity

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A retrieved policy passage used to ground an answer.
///
/// Immutable once produced by the retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Identifier of the source document
    pub document_id: String,
    /// The retrieved passage text
    pub excerpt: String,
    /// Section of the document the passage came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Similarity score (0.0 - 1.0, higher is more similar)
    pub similarity_score: f32,
    /// Source document metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub source_metadata: HashMap<String, serde_json::Value>,
}

impl Evidence {
    /// Create a new evidence item
    pub fn new(
        document_id: impl Into<String>,
        excerpt: impl Into<String>,
        similarity_score: f32,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            excerpt: excerpt.into(),
            section: None,
            similarity_score,
            source_metadata: HashMap::new(),
        }
    }

    /// Set the document section
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.source_metadata.insert(key.into(), value);
        self
    }
}

/// Fraction of evidence items at or above the relevance threshold
pub fn coverage(evidence: &[Evidence], threshold: f32) -> f32 {
    if evidence.is_empty() {
        return 0.0;
    }

    let supported = evidence
        .iter()
        .filter(|e| e.similarity_score >= threshold)
        .count();

    supported as f32 / evidence.len() as f32
}

/// The best similarity score among evidence items, if any
pub fn best_score(evidence: &[Evidence]) -> Option<f32> {
    evidence
        .iter()
        .map(|e| e.similarity_score)
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}
