//! Hybrid retrieval combining keyword and semantic search.
//!
//! This module implements a partition-aware hybrid retrieval system that
//! combines:
//! - **Semantic search** (cosine similarity via HNSW)
//! - **Keyword search** (BM25 over a minimal whitespace tokenization)
//! - **Weighted score fusion** to blend the two score mappings
//!
//! # Architecture
//!
//! - `types`: Core types (Chunk, ScoredResult)
//! - `engine`: HybridIndex orchestrating ingest and search per partition
//! - `vector`: HNSW-based semantic similarity search
//! - `keyword`: BM25 keyword scoring over a partition corpus
//! - `fusion`: Weighted score fusion over the union of both channels
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use docket_core::embedding::HashedEmbedding;
//! use docket_core::search::{Chunk, HybridIndex};
//!
//! let index = HybridIndex::new(Arc::new(HashedEmbedding::default()));
//!
//! let chunk = Chunk::new("x1", "d.pdf", 1, "Limited Warranty Terms")
//!     .with_partition("IBM_PurchaseTerms");
//! index.ingest(vec![chunk], None).await?;
//!
//! let results = index
//!     .search("warranty", "IBM_PurchaseTerms", 5, 0.6, None)
//!     .await?;
//! ```
//!
//! # Algorithm Details
//!
//! **Semantic channel (HNSW)**:
//! - Cosine distance over L2-normalized embeddings
//! - Similarity reported as `1 - distance`, clamped to `[0, 1]`
//!
//! **Keyword channel (BM25)**:
//! - Lower-cased whitespace tokenization, punctuation kept attached
//! - Every chunk in the partition receives a score
//! - Tuned parameters: k1=1.2, b=0.75 (standard)
//!
//! **Fusion**:
//! - `combined = alpha * semantic + (1 - alpha) * lexical` over the union
//! - Zero-score candidates are dropped, ties keep ingestion order

pub mod engine;
pub mod fusion;
pub mod keyword;
pub mod types;
pub mod vector;

pub use engine::HybridIndex;
pub use types::{Chunk, ScoredResult};
