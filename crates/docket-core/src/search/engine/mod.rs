//! Hybrid retrieval orchestration.
//!
//! [`HybridIndex`] owns one partition entry per logical corpus, each
//! pairing a BM25 keyword corpus with an HNSW vector index over the same
//! chunks. Ingest embeds a whole batch in one provider call and applies
//! it under per-partition write locks; search blends both channels with
//! weighted score fusion under a read lock, so searches on the same
//! partition run concurrently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::fusion::weighted_score_fusion;
use super::keyword::KeywordIndex;
use super::types::{Chunk, ScoredResult};
use super::vector::VectorIndex;
use crate::config::CANCEL_POLL_MS;
use crate::embedding::EmbeddingProvider;
use crate::error::RetrievalError;

struct Partition {
    keyword: KeywordIndex,
    vector: VectorIndex,
    chunks: HashMap<String, Chunk>,
}

impl Partition {
    fn new(dim: usize) -> Self {
        Self {
            keyword: KeywordIndex::new(),
            vector: VectorIndex::new(dim),
            chunks: HashMap::new(),
        }
    }

    fn apply(&mut self, chunk: Chunk, embedding: &[f32]) -> Result<(), RetrievalError> {
        self.keyword.upsert(&chunk.id, &chunk.text);
        self.vector.upsert(&chunk.id, embedding)?;
        self.chunks.insert(chunk.id.clone(), chunk);
        Ok(())
    }
}

type PartitionHandle = Arc<RwLock<Partition>>;

/// Partition-aware hybrid retrieval index.
///
/// Partitions are created lazily on first write and never block each
/// other: the outer table lock is held only to look up or insert a
/// partition handle, while chunk data sits behind a per-partition
/// reader-writer lock. The embedding provider call is the only
/// suspension point in either operation.
pub struct HybridIndex {
    provider: Arc<dyn EmbeddingProvider>,
    partitions: RwLock<HashMap<String, PartitionHandle>>,
    owners: RwLock<HashMap<String, String>>,
}

impl HybridIndex {
    /// Creates an empty index backed by `provider`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            partitions: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
        }
    }

    /// Validates, embeds, and indexes a batch of chunks.
    ///
    /// The whole batch goes to the provider in a single call, and nothing
    /// is written to any partition until every embedding has been
    /// validated, so a failed or cancelled ingest leaves the index
    /// untouched. Chunks reusing an existing id replace the stored chunk;
    /// ids never move between partitions.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::InvalidInput`] if a chunk fails validation or
    ///   reuses an id under a different partition
    /// - [`RetrievalError::Embedding`] if the provider fails or returns
    ///   the wrong count, wrong dimension, or non-finite components
    /// - [`RetrievalError::Cancelled`] if `cancel` was set
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn ingest(
        &self,
        chunks: Vec<Chunk>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<(), RetrievalError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut batch_partitions: HashMap<&str, &str> = HashMap::with_capacity(chunks.len());
        for chunk in &chunks {
            chunk.validate()?;
            if let Some(previous) =
                batch_partitions.insert(chunk.id.as_str(), chunk.partition.as_str())
            {
                if previous != chunk.partition {
                    return Err(RetrievalError::InvalidInput(format!(
                        "Chunk '{}' appears under partitions '{}' and '{}' in one batch",
                        chunk.id, previous, chunk.partition
                    )));
                }
            }
        }
        {
            let owners = self
                .owners
                .read()
                .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
            check_owners(&owners, chunks.iter())?;
        }

        if is_cancelled(cancel.as_deref()) {
            return Err(RetrievalError::Cancelled);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embed_batch(&texts, cancel.as_deref()).await?;
        self.check_embeddings(&embeddings, chunks.len())?;

        if is_cancelled(cancel.as_deref()) {
            return Err(RetrievalError::Cancelled);
        }

        // Group in batch order so per-partition insertion order is stable.
        let mut groups: Vec<(String, Vec<(Chunk, Vec<f32>)>)> = Vec::new();
        let mut group_slots: HashMap<String, usize> = HashMap::new();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            match group_slots.get(&chunk.partition) {
                Some(&slot) => groups[slot].1.push((chunk, embedding)),
                None => {
                    group_slots.insert(chunk.partition.clone(), groups.len());
                    groups.push((chunk.partition.clone(), vec![(chunk, embedding)]));
                }
            }
        }

        // Ownership is re-checked and updated under the write lock, so two
        // concurrent batches cannot claim one id for different partitions.
        let mut owners = self
            .owners
            .write()
            .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
        check_owners(
            &owners,
            groups
                .iter()
                .flat_map(|(_, entries)| entries.iter().map(|(chunk, _)| chunk)),
        )?;

        for (partition, entries) in groups {
            let handle = self.partition_handle(&partition)?;
            let mut guard = handle
                .write()
                .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
            let added = entries.len();
            for (chunk, embedding) in entries {
                owners.insert(chunk.id.clone(), partition.clone());
                guard.apply(chunk, &embedding)?;
            }
            info!(
                partition = %partition,
                chunks = added,
                total = guard.chunks.len(),
                "Indexed batch"
            );
        }
        Ok(())
    }

    /// Hybrid search within one partition.
    ///
    /// Scores every chunk in the partition with BM25, asks the vector
    /// index for the `top_k` nearest chunks, and blends the two mappings
    /// as `alpha * semantic + (1 - alpha) * lexical`. Only candidates
    /// with a strictly positive combined score are returned, best first;
    /// equal scores keep ingestion order. An unknown partition yields an
    /// empty result before the query is ever embedded.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::InvalidInput`] for an empty query, a zero
    ///   `top_k`, or an `alpha` outside `[0, 1]`
    /// - [`RetrievalError::Embedding`] if the provider fails on the query
    /// - [`RetrievalError::Cancelled`] if `cancel` was set
    /// - [`RetrievalError::Inconsistency`] if a ranked id has no stored
    ///   chunk in its partition
    #[instrument(skip(self, cancel), fields(partition = %partition, top_k, alpha))]
    pub async fn search(
        &self,
        query: &str,
        partition: &str,
        top_k: usize,
        alpha: f32,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Vec<ScoredResult>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::InvalidInput(
                "Query text cannot be empty".to_string(),
            ));
        }
        if top_k == 0 {
            return Err(RetrievalError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RetrievalError::InvalidInput(format!(
                "alpha must be within [0, 1], got {}",
                alpha
            )));
        }

        let handle = {
            let partitions = self
                .partitions
                .read()
                .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
            partitions.get(partition).cloned()
        };
        let Some(handle) = handle else {
            debug!(partition = %partition, "Unknown partition, returning no results");
            return Ok(Vec::new());
        };

        if is_cancelled(cancel.as_deref()) {
            return Err(RetrievalError::Cancelled);
        }

        let query_texts = vec![query.to_string()];
        let embeddings = self.embed_batch(&query_texts, cancel.as_deref()).await?;
        self.check_embeddings(&embeddings, 1)?;
        let query_embedding = &embeddings[0];

        let guard = handle
            .read()
            .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
        let lexical = guard.keyword.score_all(query);
        let semantic = guard.vector.search(query_embedding, top_k);
        debug!(
            lexical = lexical.len(),
            semantic = semantic.len(),
            "Scored partition channels"
        );

        let fused = weighted_score_fusion(&lexical, &semantic, alpha);
        let mut results = Vec::with_capacity(top_k.min(fused.len()));
        for candidate in fused.into_iter().take(top_k) {
            let Some(chunk) = guard.chunks.get(&candidate.id) else {
                warn!(
                    id = %candidate.id,
                    partition = %partition,
                    "Ranked chunk missing from partition store"
                );
                return Err(RetrievalError::Inconsistency(format!(
                    "Ranked chunk '{}' has no stored record in partition '{}'",
                    candidate.id, partition
                )));
            };
            results.push(ScoredResult {
                id: candidate.id,
                document_name: chunk.document_name.clone(),
                page_no: chunk.page_no,
                text: chunk.text.clone(),
                partition: chunk.partition.clone(),
                score: candidate.score,
                semantic_score: candidate.semantic,
                lexical_score: candidate.lexical,
            });
        }

        info!(partition = %partition, results = results.len(), "Hybrid search complete");
        Ok(results)
    }

    /// Names of all partitions, sorted.
    pub fn partitions(&self) -> Result<Vec<String>, RetrievalError> {
        let partitions = self
            .partitions
            .read()
            .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
        let mut names: Vec<String> = partitions.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Number of chunks stored in `partition`, 0 when unknown.
    pub fn partition_len(&self, partition: &str) -> Result<usize, RetrievalError> {
        let handle = {
            let partitions = self
                .partitions
                .read()
                .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
            partitions.get(partition).cloned()
        };
        match handle {
            Some(handle) => {
                let guard = handle
                    .read()
                    .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
                Ok(guard.chunks.len())
            }
            None => Ok(0),
        }
    }

    /// Total chunks across all partitions.
    pub fn len(&self) -> Result<usize, RetrievalError> {
        let owners = self
            .owners
            .read()
            .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
        Ok(owners.len())
    }

    /// True when nothing has been ingested.
    pub fn is_empty(&self) -> Result<bool, RetrievalError> {
        Ok(self.len()? == 0)
    }

    /// Returns the partition entry, creating it on first write.
    fn partition_handle(&self, partition: &str) -> Result<PartitionHandle, RetrievalError> {
        {
            let partitions = self
                .partitions
                .read()
                .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
            if let Some(handle) = partitions.get(partition) {
                return Ok(Arc::clone(handle));
            }
        }
        let mut partitions = self
            .partitions
            .write()
            .map_err(|e| RetrievalError::Index(format!("Lock poisoned: {}", e)))?;
        let handle = partitions.entry(partition.to_string()).or_insert_with(|| {
            debug!(partition = %partition, "Creating partition");
            Arc::new(RwLock::new(Partition::new(self.provider.embedding_dim())))
        });
        Ok(Arc::clone(handle))
    }

    /// Runs the provider call, racing it against the cancellation flag.
    async fn embed_batch(
        &self,
        texts: &[String],
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let Some(flag) = cancel else {
            return Ok(self.provider.embed(texts).await?);
        };

        let embed = self.provider.embed(texts);
        tokio::pin!(embed);
        loop {
            if flag.load(Ordering::Relaxed) {
                info!("Cancelled while embedding");
                return Err(RetrievalError::Cancelled);
            }
            tokio::select! {
                output = &mut embed => return Ok(output?),
                _ = tokio::time::sleep(Duration::from_millis(CANCEL_POLL_MS)) => {}
            }
        }
    }

    /// Rejects provider output with a wrong count, wrong dimension, or
    /// non-finite components.
    fn check_embeddings(
        &self,
        embeddings: &[Vec<f32>],
        expected: usize,
    ) -> Result<(), RetrievalError> {
        if embeddings.len() != expected {
            return Err(RetrievalError::Embedding(format!(
                "Provider returned {} embeddings for {} texts",
                embeddings.len(),
                expected
            )));
        }
        let dim = self.provider.embedding_dim();
        for embedding in embeddings {
            if embedding.len() != dim {
                return Err(RetrievalError::Embedding(format!(
                    "Provider returned dimension {}, expected {}",
                    embedding.len(),
                    dim
                )));
            }
            if embedding.iter().any(|component| !component.is_finite()) {
                return Err(RetrievalError::Embedding(
                    "Provider returned non-finite embedding components".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn check_owners<'a>(
    owners: &HashMap<String, String>,
    chunks: impl Iterator<Item = &'a Chunk>,
) -> Result<(), RetrievalError> {
    for chunk in chunks {
        if let Some(owner) = owners.get(&chunk.id) {
            if owner != &chunk.partition {
                return Err(RetrievalError::InvalidInput(format!(
                    "Chunk '{}' already belongs to partition '{}', cannot move it to '{}'",
                    chunk.id, owner, chunk.partition
                )));
            }
        }
    }
    Ok(())
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}
