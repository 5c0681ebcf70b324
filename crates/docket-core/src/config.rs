//! Production configuration constants.
//!
//! This module contains constants that define the production configuration
//! for Docket. The library and the CLI both read from here so retrieval
//! behaves identically everywhere it runs.
//!
//! # Usage
//!
//! ```
//! use docket_core::config::{DEFAULT_ALPHA, DEFAULT_TOP_K};
//!
//! let top_k = DEFAULT_TOP_K;
//! assert!((0.0..=1.0).contains(&DEFAULT_ALPHA));
//! ```

// =============================================================================
// Retrieval Configuration
// =============================================================================

/// Default number of results returned by a hybrid search.
pub const DEFAULT_TOP_K: usize = 5;

/// Default weight of the semantic channel in score fusion.
///
/// Combined scores follow `alpha * semantic + (1 - alpha) * lexical`.
/// 0.6 favors semantic similarity while keeping exact keyword matches
/// competitive.
pub const DEFAULT_ALPHA: f32 = 0.6;

/// Partition assigned to chunks whose document has no explicit mapping.
pub const DEFAULT_PARTITION: &str = "general";

// =============================================================================
// BM25 Configuration
// =============================================================================

/// Term-frequency saturation parameter (standard value).
pub const BM25_K1: f32 = 1.2;

/// Document-length normalization strength (standard value).
pub const BM25_B: f32 = 0.75;

// =============================================================================
// Embedding Configuration
// =============================================================================

/// Vector dimension of the built-in hashing provider.
///
/// Model-backed providers bring their own dimension; the index always
/// follows `EmbeddingProvider::embedding_dim` at runtime.
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

// =============================================================================
// Runtime Configuration
// =============================================================================

/// How often an in-flight embedding call polls its cancellation flag,
/// in milliseconds.
pub const CANCEL_POLL_MS: u64 = 50;

/// Conversation history length, in words, that triggers summarization.
pub const MAX_HISTORY_WORDS: usize = 1200;
