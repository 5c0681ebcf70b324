//! Error types for docket-core.
//!
//! This module defines the error types used across the library: retrieval
//! index failures, embedding provider failures, and agent pipeline
//! failures.

use thiserror::Error;

/// Errors surfaced by the hybrid retrieval index.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// Embedding provider failed or returned unusable vectors
    #[error("Embedding failed: {0}")]
    Embedding(String),
    /// Caller-supplied input rejected before touching the index
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A ranked id could not be resolved to its stored chunk
    #[error("Index inconsistency: {0}")]
    Inconsistency(String),
    /// Operation aborted by its cancellation flag
    #[error("Operation cancelled")]
    Cancelled,
    /// Internal index failure such as a poisoned lock
    #[error("Index error: {0}")]
    Index(String),
}

/// Errors produced by embedding providers.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Provider backend failed to produce embeddings
    #[error("Embedding provider failed: {0}")]
    Provider(String),
    /// Provider returned a vector of the wrong dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the provider advertises
        expected: usize,
        /// Dimension actually returned
        actual: usize,
    },
}

impl From<EmbeddingError> for RetrievalError {
    fn from(err: EmbeddingError) -> Self {
        RetrievalError::Embedding(err.to_string())
    }
}

/// Errors from the question-answering pipeline.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Completion model failed to produce a response
    #[error("Completion failed: {0}")]
    Completion(String),
    /// Retrieval layer failure
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}
