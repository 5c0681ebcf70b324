//! Embedding provider abstractions and implementations.
//!
//! The retrieval index depends only on the [`EmbeddingProvider`] trait;
//! model inference itself lives outside this crate. [`HashedEmbedding`]
//! is the built-in deterministic implementation used by tests and by the
//! CLI's offline mode.

mod hashed;
mod traits;

pub use hashed::HashedEmbedding;
pub use traits::EmbeddingProvider;
