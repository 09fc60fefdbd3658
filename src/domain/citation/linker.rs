//! Citation linking - mapping grounding evidence to deduplicated citations

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::retrieval::Evidence;

/// A citation attached to a response.
///
/// Deduplication key is `document_id`: a response never carries two
/// citations for the same source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Identifier of the cited document
    pub document_id: String,
    /// Excerpt the citation was derived from
    pub excerpt: String,
    /// Relevance score of the underlying evidence (0.0 - 1.0)
    pub relevance_score: f32,
}

impl Citation {
    /// Create a new citation
    pub fn new(
        document_id: impl Into<String>,
        excerpt: impl Into<String>,
        relevance_score: f32,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            excerpt: excerpt.into(),
            relevance_score,
        }
    }
}

/// Links a draft answer to the evidence that grounded it.
#[derive(Debug, Clone)]
pub struct CitationLinker {
    /// Evidence below this relevance is not cited
    relevance_threshold: f32,
}

impl CitationLinker {
    /// Create a linker with the given citation relevance threshold
    pub fn new(relevance_threshold: f32) -> Self {
        Self {
            relevance_threshold: relevance_threshold.clamp(0.0, 1.0),
        }
    }

    /// Get the relevance threshold
    pub fn relevance_threshold(&self) -> f32 {
        self.relevance_threshold
    }

    /// Produce the final answer and its citations.
    ///
    /// Every evidence item at or above the relevance threshold yields a
    /// citation; duplicates by `document_id` keep the highest observed
    /// score. The citation count therefore never exceeds the number of
    /// distinct document ids in the supplied evidence, and every citation's
    /// `relevance_score` equals the score of the evidence it came from.
    pub fn link(&self, draft_answer: &str, evidence: &[Evidence]) -> (String, Vec<Citation>) {
        let mut by_document: HashMap<&str, &Evidence> = HashMap::new();

        for item in evidence {
            if item.similarity_score < self.relevance_threshold {
                continue;
            }

            match by_document.get(item.document_id.as_str()) {
                Some(existing) if existing.similarity_score >= item.similarity_score => {}
                _ => {
                    by_document.insert(&item.document_id, item);
                }
            }
        }

        let mut citations: Vec<Citation> = by_document
            .into_values()
            .map(|item| {
                Citation::new(&item.document_id, &item.excerpt, item.similarity_score)
            })
            .collect();

        citations.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });

        (draft_answer.to_string(), citations)
    }
}

impl Default for CitationLinker {
    fn default() -> Self {
        Self::new(0.6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_citation_per_evidence_item() {
        let linker = CitationLinker::default();
        let evidence = vec![
            Evidence::new("policy-a", "First passage", 0.9),
            Evidence::new("policy-b", "Second passage", 0.7),
        ];

        let (answer, citations) = linker.link("The answer.", &evidence);

        assert_eq!(answer, "The answer.");
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].document_id, "policy-a");
        assert_eq!(citations[0].relevance_score, 0.9);
    }

    #[test]
    fn test_deduplicates_by_document_id_keeping_highest_score() {
        let linker = CitationLinker::default();
        let evidence = vec![
            Evidence::new("policy-a", "Chunk one", 0.7),
            Evidence::new("policy-a", "Chunk two", 0.95),
            Evidence::new("policy-a", "Chunk three", 0.8),
        ];

        let (_, citations) = linker.link("Answer", &evidence);

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].relevance_score, 0.95);
        assert_eq!(citations[0].excerpt, "Chunk two");
    }

    #[test]
    fn test_citation_count_bounded_by_distinct_documents() {
        let linker = CitationLinker::new(0.0);
        let evidence: Vec<Evidence> = (0..12)
            .map(|i| Evidence::new(format!("doc-{}", i % 4), "x", 0.9))
            .collect();

        let (_, citations) = linker.link("Answer", &evidence);

        assert_eq!(citations.len(), 4);
    }

    #[test]
    fn test_below_threshold_evidence_is_not_cited() {
        let linker = CitationLinker::new(0.6);
        let evidence = vec![
            Evidence::new("policy-a", "Strong", 0.9),
            Evidence::new("policy-b", "Weak", 0.3),
        ];

        let (_, citations) = linker.link("Answer", &evidence);

        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].document_id, "policy-a");
    }

    #[test]
    fn test_empty_evidence_yields_no_citations() {
        let linker = CitationLinker::default();

        let (answer, citations) = linker.link("No grounding here.", &[]);

        assert_eq!(answer, "No grounding here.");
        assert!(citations.is_empty());
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let linker = CitationLinker::default();
        let evidence = vec![
            Evidence::new("policy-a", "One", 0.9),
            Evidence::new("policy-a", "Two", 0.8),
            Evidence::new("policy-b", "Three", 0.7),
        ];

        let (_, first) = linker.link("Answer", &evidence);
        let (_, second) = linker.link("Answer", &evidence);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.document_id, b.document_id);
            assert_eq!(a.relevance_score, b.relevance_score);
        }
    }
}
