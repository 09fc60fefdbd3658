//! Policy document chunking for index construction

use crate::domain::DomainError;

/// Configuration for paragraph chunking
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target maximum chunk size in characters
    pub chunk_size: usize,
    /// Chunks shorter than this are dropped
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            min_chunk_size: 20,
        }
    }

    /// Set the minimum chunk size
    pub fn with_min_chunk_size(mut self, min: usize) -> Self {
        self.min_chunk_size = min;
        self
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be positive"));
        }
        if self.min_chunk_size > self.chunk_size {
            return Err(DomainError::validation(
                "min_chunk_size cannot exceed chunk_size",
            ));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(500)
    }
}

/// Split a policy document into paragraph-aligned chunks.
///
/// Paragraphs are packed greedily up to `chunk_size`; a single oversized
/// paragraph becomes its own chunk rather than being split mid-sentence.
pub fn chunk_paragraphs(content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
    config.validate()?;

    let content = content.trim();
    if content.is_empty() {
        return Ok(vec![]);
    }

    if content.len() <= config.chunk_size {
        return Ok(vec![content.to_string()]);
    }

    let paragraphs: Vec<&str> = content
        .split("\n\n")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        if current.is_empty() {
            current.push_str(paragraph);
        } else if current.len() + 2 + paragraph.len() <= config.chunk_size {
            current.push_str("\n\n");
            current.push_str(paragraph);
        } else {
            if current.len() >= config.min_chunk_size {
                chunks.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current.push_str(paragraph);
        }
    }

    if current.len() >= config.min_chunk_size {
        chunks.push(current);
    }

    if chunks.is_empty() {
        chunks.push(content.to_string());
    }

    Ok(chunks)
}
