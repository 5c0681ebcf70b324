//! Feature-hashing embedding provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use super::traits::EmbeddingProvider;
use crate::config::DEFAULT_EMBEDDING_DIM;
use crate::error::EmbeddingError;

/// Deterministic bag-of-words embeddings via feature hashing.
///
/// Each whitespace token is lower-cased, hashed into one of `dim` buckets
/// with a hash-derived sign, and the accumulated vector is L2-normalized.
/// Similarity between two texts therefore tracks their token overlap.
///
/// No model weights are involved, which makes this provider suitable for
/// tests and for running the CLI without inference hardware. Production
/// deployments inject a model-backed [`EmbeddingProvider`] instead.
pub struct HashedEmbedding {
    dim: usize,
}

impl HashedEmbedding {
    /// Creates a provider emitting `dim`-dimensional vectors.
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let hash = hasher.finish();
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for component in &mut vector {
                *component /= norm;
            }
        }
        vector
    }
}

impl Default for HashedEmbedding {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedding {
    fn embedding_dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_embeds_identically() {
        let provider = HashedEmbedding::new(64);
        let texts = vec!["limited warranty terms".to_string()];

        let first = provider.embed(&texts).await.unwrap();
        let second = provider.embed(&texts).await.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn case_is_folded_before_hashing() {
        let provider = HashedEmbedding::new(64);

        assert_eq!(provider.embed_text("Warranty"), provider.embed_text("warranty"));
    }

    #[test]
    fn token_order_does_not_matter() {
        let provider = HashedEmbedding::new(64);

        assert_eq!(
            provider.embed_text("purchase terms"),
            provider.embed_text("terms purchase")
        );
    }

    #[test]
    fn nonempty_text_embeds_to_unit_length() {
        let provider = HashedEmbedding::new(64);

        let vector = provider.embed_text("invoices are payable within thirty days");
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn blank_text_embeds_to_zero_vector() {
        let provider = HashedEmbedding::new(64);

        let vector = provider.embed_text("   ");

        assert!(vector.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let provider = HashedEmbedding::new(64);
        let texts = vec!["first text".to_string(), "second text".to_string()];

        let batch = provider.embed(&texts).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed_text("first text"));
        assert_eq!(batch[1], provider.embed_text("second text"));
    }

    #[test]
    fn dimension_is_respected() {
        let provider = HashedEmbedding::new(32);

        assert_eq!(provider.embedding_dim(), 32);
        assert_eq!(provider.embed_text("some text").len(), 32);
    }
}
