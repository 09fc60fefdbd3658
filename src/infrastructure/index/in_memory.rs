//! In-memory policy index for development and testing

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::retrieval::{SearchHit, SimilaritySearch};
use crate::domain::DomainError;

/// A passage stored in the in-memory index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Identifier of the source document
    pub document_id: String,
    /// Passage text
    pub content: String,
    /// Section of the source document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Source document metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl IndexedDocument {
    /// Create a new indexed passage
    pub fn new(document_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            content: content.into(),
            section: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the section
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

static STOPWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "the", "and", "for", "are", "was", "what", "when", "where", "which", "who", "how",
        "does", "about", "with", "that", "this", "from", "can", "you", "your", "our",
    ]
});

/// Deterministic in-memory similarity search.
///
/// Scores passages by the fraction of significant query terms they contain,
/// standing in for the production nearest-neighbor service. The same query
/// against the same snapshot always yields the same ranking.
#[derive(Debug)]
pub struct InMemoryPolicyIndex {
    documents: Arc<RwLock<Vec<IndexedDocument>>>,
}

impl InMemoryPolicyIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create an index seeded with the given passages
    pub fn with_documents(documents: Vec<IndexedDocument>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// Append passages to the index
    pub async fn add_documents(&self, documents: Vec<IndexedDocument>) {
        self.documents.write().await.extend(documents);
    }

    /// Load an index snapshot from a JSON file
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let data = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DomainError::index(format!(
                "Failed to read snapshot {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let documents: Vec<IndexedDocument> = serde_json::from_str(&data)
            .map_err(|e| DomainError::index(format!("Failed to parse snapshot: {}", e)))?;

        Ok(Self::with_documents(documents))
    }

    /// Write the index contents to a JSON snapshot file
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<usize, DomainError> {
        let documents = self.documents.read().await;

        let data = serde_json::to_string_pretty(&*documents)
            .map_err(|e| DomainError::index(format!("Failed to serialize snapshot: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::index(format!("Failed to create snapshot directory: {}", e))
            })?;
        }

        std::fs::write(path.as_ref(), data).map_err(|e| {
            DomainError::index(format!(
                "Failed to write snapshot {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(documents.len())
    }

    fn significant_terms(text: &str) -> Vec<String> {
        let mut terms: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
            .map(|t| t.to_string())
            .collect();

        terms.sort();
        terms.dedup();
        terms
    }

    fn score(query_terms: &[String], content: &str) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }

        let content_lower = content.to_lowercase();
        let matched = query_terms
            .iter()
            .filter(|t| content_lower.contains(t.as_str()))
            .count();

        matched as f32 / query_terms.len() as f32
    }
}

impl Default for InMemoryPolicyIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SimilaritySearch for InMemoryPolicyIndex {
    async fn search(&self, query: &str, k: u32) -> Result<Vec<SearchHit>, DomainError> {
        let query_terms = Self::significant_terms(query);
        let documents = self.documents.read().await;

        let mut hits: Vec<SearchHit> = documents
            .iter()
            .filter_map(|doc| {
                let score = Self::score(&query_terms, &doc.content);
                if score <= 0.0 {
                    return None;
                }

                let mut hit = SearchHit::new(&doc.document_id, &doc.content, score);
                if let Some(section) = &doc.section {
                    hit = hit.with_section(section);
                }
                hit.metadata = doc.metadata.clone();
                Some(hit)
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(k as usize);

        Ok(hits)
    }

    async fn document_count(&self) -> Result<usize, DomainError> {
        Ok(self.documents.read().await.len())
    }

    fn index_name(&self) -> &'static str {
        "in_memory"
    }
}
