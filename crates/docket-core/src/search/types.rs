//! Core types for the hybrid retrieval index.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PARTITION;
use crate::error::RetrievalError;

/// A page-sized unit of indexed text.
///
/// Chunks arrive from document preparation, one per extracted page, and
/// are validated at the ingest boundary rather than on construction.
/// Ids are globally unique: once a chunk id has been ingested into a
/// partition it stays there, and re-ingesting the same id replaces the
/// stored chunk in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique stable identifier
    pub id: String,
    /// Source document file name
    pub document_name: String,
    /// 1-based page number within the source document
    pub page_no: u32,
    /// Page text, non-empty once trimmed
    pub text: String,
    /// Logical corpus this chunk belongs to
    pub partition: String,
}

impl Chunk {
    /// Creates a chunk in the default partition.
    pub fn new(
        id: impl Into<String>,
        document_name: impl Into<String>,
        page_no: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            document_name: document_name.into(),
            page_no,
            text: text.into(),
            partition: DEFAULT_PARTITION.to_string(),
        }
    }

    /// Assigns the partition, builder-style.
    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    /// Checks the ingest-boundary invariants.
    ///
    /// Ids and partitions must be non-blank, page numbers start at 1,
    /// and text must survive trimming.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.id.trim().is_empty() {
            return Err(RetrievalError::InvalidInput(
                "Chunk id cannot be empty".to_string(),
            ));
        }
        if self.text.trim().is_empty() {
            return Err(RetrievalError::InvalidInput(format!(
                "Chunk '{}' has empty text",
                self.id
            )));
        }
        if self.partition.trim().is_empty() {
            return Err(RetrievalError::InvalidInput(format!(
                "Chunk '{}' has empty partition",
                self.id
            )));
        }
        if self.page_no == 0 {
            return Err(RetrievalError::InvalidInput(format!(
                "Chunk '{}' has page_no 0, pages are 1-based",
                self.id
            )));
        }
        Ok(())
    }
}

/// A ranked search hit with citation metadata and per-channel provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Chunk identifier
    pub id: String,
    /// Source document file name
    pub document_name: String,
    /// 1-based page number
    pub page_no: u32,
    /// Chunk text
    pub text: String,
    /// Partition the chunk was retrieved from
    pub partition: String,
    /// Combined weighted score
    pub score: f32,
    /// Cosine similarity, if the semantic channel ranked this chunk
    pub semantic_score: Option<f32>,
    /// BM25 score, if the lexical channel scored this chunk
    pub lexical_score: Option<f32>,
}
