//! HNSW-based semantic similarity search.
//!
//! Embeddings are L2-normalized on the way in and compared with cosine
//! distance. HNSW slots are append-only, so replacing an id tombstones
//! the old slot and inserts a fresh vector; tombstoned slots are filtered
//! out of every search.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use hnsw::{Hnsw, Searcher};
use rand::rngs::StdRng;
use space::{Metric, Neighbor};

use crate::error::RetrievalError;

/// Minimum ef parameter for HNSW search quality.
const MIN_EF_SEARCH: usize = 50;

/// Cosine distance metric for HNSW, mapped onto `u32`.
///
/// Distance is `1 - cos(a, b)` scaled by `u32::MAX / 2`, so 0 means
/// identical direction and `u32::MAX` covers the zero-vector case.
struct CosineDistance;

impl Metric<Box<[f32]>> for CosineDistance {
    type Unit = u32;

    fn distance(&self, a: &Box<[f32]>, b: &Box<[f32]>) -> u32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|&x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|&x| x * x).sum::<f32>().sqrt();

        if mag_a == 0.0 || mag_b == 0.0 {
            return u32::MAX;
        }

        let distance = 1.0 - dot / (mag_a * mag_b);
        (distance * (u32::MAX as f32 / 2.0)) as u32
    }
}

/// Semantic index for a single partition.
pub struct VectorIndex {
    index: Hnsw<CosineDistance, Box<[f32]>, StdRng, 16, 32>,
    dim: usize,
    slot_ids: Vec<String>,
    slots: HashMap<String, usize>,
    tombstones: HashSet<usize>,
}

impl VectorIndex {
    /// Creates an empty index for `dim`-dimensional embeddings.
    pub fn new(dim: usize) -> Self {
        Self {
            index: Hnsw::new(CosineDistance),
            dim,
            slot_ids: Vec::new(),
            slots: HashMap::new(),
            tombstones: HashSet::new(),
        }
    }

    /// Number of live vectors.
    pub fn len(&self) -> usize {
        self.slot_ids.len() - self.tombstones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Inserts an embedding, replacing any previous vector stored under
    /// `id`.
    pub fn upsert(&mut self, id: &str, embedding: &[f32]) -> Result<(), RetrievalError> {
        if embedding.len() != self.dim {
            return Err(RetrievalError::Inconsistency(format!(
                "Embedding for chunk '{}' has dimension {}, index expects {}",
                id,
                embedding.len(),
                self.dim
            )));
        }

        let mut normalized = embedding.to_vec();
        normalize(&mut normalized);

        let mut searcher = Searcher::default();
        self.index
            .insert(normalized.into_boxed_slice(), &mut searcher);

        let slot = self.slot_ids.len();
        self.slot_ids.push(id.to_string());
        if let Some(old_slot) = self.slots.insert(id.to_string(), slot) {
            self.tombstones.insert(old_slot);
        }
        Ok(())
    }

    /// Nearest neighbors by cosine similarity.
    ///
    /// Returns up to `k` live `(id, similarity)` pairs, best first.
    /// Similarity is `1 - distance`, clamped to `[0, 1]`.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(String, f32)> {
        if k == 0 || self.is_empty() || query.len() != self.dim {
            return Vec::new();
        }

        let mut normalized = query.to_vec();
        normalize(&mut normalized);
        let query_box = normalized.into_boxed_slice();

        // Oversample past tombstoned slots so overwrites never shrink
        // the live result set.
        let want = (k + self.tombstones.len()).min(self.slot_ids.len());
        let ef_search = (want * 2).max(MIN_EF_SEARCH);
        let mut searcher = Searcher::default();
        let mut neighbors = vec![
            Neighbor {
                index: !0,
                distance: !0,
            };
            want
        ];
        self.index
            .nearest(&query_box, ef_search, &mut searcher, &mut neighbors);

        let mut results = Vec::with_capacity(k);
        for neighbor in neighbors {
            if neighbor.index == !0 || self.tombstones.contains(&neighbor.index) {
                continue;
            }
            let similarity = 1.0 - (neighbor.distance as f32) / (u32::MAX as f32 / 2.0);
            results.push((
                self.slot_ids[neighbor.index].clone(),
                similarity.clamp(0.0, 1.0),
            ));
        }
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        results.truncate(k);
        results
    }
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for component in vector.iter_mut() {
            *component /= norm;
        }
    }
}
