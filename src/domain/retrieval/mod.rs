//! Evidence retrieval over the policy index

pub mod evidence;
pub mod retriever;
pub mod search;

pub use evidence::{best_score, coverage, Evidence};
pub use retriever::{EvidenceRetriever, RetrieverConfig};
pub use search::{SearchHit, SimilaritySearch};
