//! End-to-end integration tests for the complete ingest and search
//! pipeline.
//!
//! These tests exercise the full workflow against the deterministic
//! hashing provider: page preparation → batch embedding → HNSW/BM25
//! indexing → weighted score fusion → result ranking. A fixed-vector
//! provider stands in where a test needs exact control over semantic
//! similarity.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use docket_core::corpus::{prepare_chunks, PageText};
use docket_core::embedding::{EmbeddingProvider, HashedEmbedding};
use docket_core::error::{EmbeddingError, RetrievalError};
use docket_core::search::{Chunk, HybridIndex};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Returns a fixed vector per known text; fails on anything unscripted.
struct StaticProvider {
    dim: usize,
    table: HashMap<String, Vec<f32>>,
}

impl StaticProvider {
    fn new(dim: usize, entries: &[(&str, Vec<f32>)]) -> Arc<Self> {
        Arc::new(Self {
            dim,
            table: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for StaticProvider {
    fn embedding_dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts
            .iter()
            .map(|text| {
                self.table
                    .get(text)
                    .cloned()
                    .ok_or_else(|| EmbeddingError::Provider(format!("unscripted text: {text}")))
            })
            .collect()
    }
}

fn chunk(id: &str, partition: &str, text: &str) -> Chunk {
    Chunk::new(id, format!("{id}.pdf"), 1, text).with_partition(partition)
}

fn hashed_index() -> HybridIndex {
    HybridIndex::new(Arc::new(HashedEmbedding::new(128)))
}

/// A small agreement corpus spanning two partitions.
async fn sample_index() -> HybridIndex {
    let index = hashed_index();
    index
        .ingest(
            vec![
                chunk(
                    "pt1",
                    "IBM_PurchaseTerms",
                    "Limited warranty terms cover repair or replacement of defective parts.",
                ),
                chunk(
                    "pt2",
                    "IBM_PurchaseTerms",
                    "Invoices are payable within thirty days of receipt.",
                ),
                chunk(
                    "pt3",
                    "IBM_PurchaseTerms",
                    "Delivery schedules are confirmed at order acceptance.",
                ),
                chunk(
                    "lic1",
                    "International_Program_License_Agreement",
                    "The license grants a non-exclusive right to use the program.",
                ),
                chunk(
                    "lic2",
                    "International_Program_License_Agreement",
                    "Warranty for licensed programs is limited to media defects.",
                ),
            ],
            None,
        )
        .await
        .unwrap();
    index
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn pages_flow_from_preparation_to_search() {
    let pages = vec![
        PageText {
            document_name: "IBM PurchaseTerms.pdf".to_string(),
            page_no: 1,
            text: "Limited warranty terms cover repairs.".to_string(),
        },
        PageText {
            document_name: "IBM PurchaseTerms.pdf".to_string(),
            page_no: 2,
            text: "   ".to_string(),
        },
        PageText {
            document_name: "Handbook.pdf".to_string(),
            page_no: 1,
            text: "Office access policies.".to_string(),
        },
    ];

    let index = hashed_index();
    index.ingest(prepare_chunks(pages), None).await.unwrap();

    assert_eq!(index.len().unwrap(), 2);
    let results = index
        .search("warranty", "IBM_PurchaseTerms", 5, 0.6, None)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document_name, "IBM PurchaseTerms.pdf");
    assert_eq!(results[0].page_no, 1);
}

/// Ingesting one chunk and searching for its key term returns exactly
/// that chunk.
#[tokio::test]
async fn warranty_round_trip() {
    let index = hashed_index();
    index
        .ingest(
            vec![Chunk::new("x1", "d.pdf", 1, "Limited Warranty Terms")
                .with_partition("IBM_PurchaseTerms")],
            None,
        )
        .await
        .unwrap();

    let results = index
        .search("warranty", "IBM_PurchaseTerms", 1, 0.6, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "x1");
}

// ============================================================================
// Observable Properties
// ============================================================================

#[tokio::test]
async fn search_is_deterministic() {
    let index = sample_index().await;

    let first = index
        .search("warranty repair", "IBM_PurchaseTerms", 5, 0.6, None)
        .await
        .unwrap();
    let second = index
        .search("warranty repair", "IBM_PurchaseTerms", 5, 0.6, None)
        .await
        .unwrap();

    assert!(!first.is_empty());
    assert_eq!(first.len(), second.len());
    for (left, right) in first.iter().zip(second.iter()) {
        assert_eq!(left.id, right.id);
        assert_eq!(left.score, right.score);
    }
}

#[tokio::test]
async fn partitions_never_leak_into_each_other() {
    let index = sample_index().await;

    let purchase = index
        .search("warranty", "IBM_PurchaseTerms", 10, 0.6, None)
        .await
        .unwrap();
    let license = index
        .search("warranty", "International_Program_License_Agreement", 10, 0.6, None)
        .await
        .unwrap();

    assert!(purchase
        .iter()
        .all(|result| result.partition == "IBM_PurchaseTerms"));
    assert!(license
        .iter()
        .all(|result| result.partition == "International_Program_License_Agreement"));
    assert!(purchase.iter().all(|result| result.id != "lic2"));
    assert!(license.iter().any(|result| result.id == "lic2"));
}

#[tokio::test]
async fn unindexed_partition_returns_nothing() {
    let index = sample_index().await;

    let results = index
        .search("warranty", "IBM_Standard_Terms_and_Conditions", 5, 0.6, None)
        .await
        .unwrap();

    assert!(results.is_empty());
}

/// Raising alpha must never push down the chunk with the highest
/// semantic similarity. One chunk matches the query lexically but not
/// semantically, the other the reverse.
#[tokio::test]
async fn alpha_monotonically_favors_the_semantic_winner() {
    let lexical_text = "warranty warranty warranty warranty";
    let semantic_text = "coverage of repairs and replacements";
    let provider = StaticProvider::new(
        4,
        &[
            (lexical_text, vec![0.0, 1.0, 0.0, 0.0]),
            (semantic_text, vec![1.0, 0.0, 0.0, 0.0]),
            ("warranty", vec![1.0, 0.0, 0.0, 0.0]),
        ],
    );
    let index = HybridIndex::new(provider);
    index
        .ingest(
            vec![
                chunk("lex", "general", lexical_text),
                chunk("sem", "general", semantic_text),
            ],
            None,
        )
        .await
        .unwrap();

    let mut previous_rank = usize::MAX;
    for alpha in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let results = index.search("warranty", "general", 5, alpha, None).await.unwrap();
        let rank = results
            .iter()
            .position(|result| result.id == "sem")
            .unwrap_or(results.len());
        assert!(
            rank <= previous_rank,
            "semantic winner dropped from rank {previous_rank} to {rank} at alpha {alpha}"
        );
        previous_rank = rank;
    }

    let semantic_only = index.search("warranty", "general", 5, 1.0, None).await.unwrap();
    assert_eq!(semantic_only[0].id, "sem");
    let lexical_only = index.search("warranty", "general", 5, 0.0, None).await.unwrap();
    assert_eq!(lexical_only[0].id, "lex");
}

#[tokio::test]
async fn result_length_is_bounded_by_top_k_and_matches() {
    let index = sample_index().await;

    // Two chunks in the partition mention warranties or repairs.
    let all = index
        .search("warranty repair", "IBM_PurchaseTerms", 10, 0.6, None)
        .await
        .unwrap();
    let capped = index
        .search("warranty repair", "IBM_PurchaseTerms", 1, 0.6, None)
        .await
        .unwrap();

    assert!(all.len() <= 10);
    assert!(!all.is_empty());
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].id, all[0].id);
}

/// Duplicate ids follow last-write-wins within a partition.
#[tokio::test]
async fn duplicate_id_overwrites_previous_chunk() {
    let index = hashed_index();
    index
        .ingest(
            vec![chunk("x1", "general", "thirty day warranty period")],
            None,
        )
        .await
        .unwrap();
    index
        .ingest(
            vec![chunk("x1", "general", "ninety day warranty period")],
            None,
        )
        .await
        .unwrap();

    assert_eq!(index.len().unwrap(), 1);
    let results = index.search("warranty", "general", 5, 0.6, None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "ninety day warranty period");

    // The same id can never resurface in a second partition.
    let moved = index
        .ingest(vec![chunk("x1", "license", "relocated text")], None)
        .await;
    assert!(matches!(moved, Err(RetrievalError::InvalidInput(_))));
}

// ============================================================================
// Error Propagation
// ============================================================================

#[tokio::test]
async fn provider_failure_surfaces_through_search() {
    let provider = StaticProvider::new(4, &[("indexed text", vec![1.0, 0.0, 0.0, 0.0])]);
    let index = HybridIndex::new(provider);
    index
        .ingest(vec![chunk("x1", "general", "indexed text")], None)
        .await
        .unwrap();

    // The query text is unscripted, so the provider fails on it.
    let err = index
        .search("unscripted query", "general", 5, 0.6, None)
        .await
        .unwrap_err();

    assert!(matches!(err, RetrievalError::Embedding(_)));
}

#[tokio::test]
async fn invalid_arguments_are_rejected_before_any_work() {
    let index = sample_index().await;

    assert!(matches!(
        index.search("", "IBM_PurchaseTerms", 5, 0.6, None).await,
        Err(RetrievalError::InvalidInput(_))
    ));
    assert!(matches!(
        index.search("warranty", "IBM_PurchaseTerms", 0, 0.6, None).await,
        Err(RetrievalError::InvalidInput(_))
    ));
    assert!(matches!(
        index.search("warranty", "IBM_PurchaseTerms", 5, 1.2, None).await,
        Err(RetrievalError::InvalidInput(_))
    ));
}
