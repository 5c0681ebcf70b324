//! Embedding provider trait.

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Batch text embedding backend.
///
/// Implementations wrap whatever actually produces vectors: an in-process
/// model, a remote inference service, or the hashing provider used in
/// tests. The index calls [`embed`](EmbeddingProvider::embed) once per
/// ingest batch and once per query, so providers should batch internally
/// rather than expect per-text calls.
///
/// # Contract
///
/// - Exactly one vector is returned per input text, in input order.
/// - Every vector has [`embedding_dim`](EmbeddingProvider::embedding_dim)
///   components, all finite.
/// - Vectors should be L2-normalized to unit length. The index normalizes
///   stored and query vectors itself, so cosine similarity holds either
///   way.
///
/// # Thread Safety
///
/// Providers are shared behind `Arc` and called concurrently, so
/// implementations must be `Send + Sync`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimension of every vector this provider produces.
    fn embedding_dim(&self) -> usize;

    /// Embeds a batch of texts.
    ///
    /// # Arguments
    ///
    /// * `texts` - Input texts, one embedding produced per entry
    ///
    /// # Returns
    ///
    /// One vector per input text, each `embedding_dim()` components long.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
