//! BM25 keyword scoring over a partition corpus.
//!
//! # Algorithm
//!
//! Okapi BM25 with the usual parameters (k1=1.2, b=0.75) and a
//! non-negative IDF:
//!
//! ```text
//! idf(t)      = ln(1 + (N - df + 0.5) / (df + 0.5))
//! score(d, q) = sum over t in q of
//!               idf(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))
//! ```
//!
//! Corpus statistics (document frequencies, document lengths, the length
//! total) are maintained incrementally on every upsert, so adding chunks
//! never rescans the corpus and scoring always reads current statistics.
//!
//! # Tokenization
//!
//! Text is lower-cased and split on Unicode whitespace, nothing more.
//! Punctuation stays attached to its token, so `warranty.` and `warranty`
//! are distinct terms.
//!
//! # Integration
//!
//! One `KeywordIndex` exists per partition, owned by the engine's
//! partition table. Scoring covers every stored chunk; the engine's
//! fusion step decides what survives.

use std::collections::HashMap;

use tracing::instrument;

use crate::config::{BM25_B, BM25_K1};

/// Lower-cases and splits on Unicode whitespace.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

struct DocEntry {
    id: String,
    term_freqs: HashMap<String, usize>,
    len: usize,
}

/// Additive BM25 corpus for a single partition.
///
/// Chunks are held in insertion order. Re-adding an id replaces the
/// stored text in place and keeps the original insertion slot, so the
/// ordering the engine uses for tie-breaking is stable across overwrites.
pub struct KeywordIndex {
    docs: Vec<DocEntry>,
    slots: HashMap<String, usize>,
    doc_freqs: HashMap<String, usize>,
    total_len: usize,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self {
            docs: Vec::new(),
            slots: HashMap::new(),
            doc_freqs: HashMap::new(),
            total_len: 0,
        }
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Adds a chunk's text, replacing any previous text stored under `id`.
    #[instrument(skip_all, fields(id = %id, text_len = text.len()))]
    pub fn upsert(&mut self, id: &str, text: &str) {
        let mut term_freqs: HashMap<String, usize> = HashMap::new();
        for token in tokenize(text) {
            *term_freqs.entry(token).or_insert(0) += 1;
        }
        let len: usize = term_freqs.values().sum();

        for term in term_freqs.keys() {
            *self.doc_freqs.entry(term.clone()).or_insert(0) += 1;
        }
        self.total_len += len;

        let entry = DocEntry {
            id: id.to_string(),
            term_freqs,
            len,
        };
        if let Some(&slot) = self.slots.get(id) {
            let old = std::mem::replace(&mut self.docs[slot], entry);
            for term in old.term_freqs.keys() {
                let exhausted = match self.doc_freqs.get_mut(term) {
                    Some(df) => {
                        *df -= 1;
                        *df == 0
                    }
                    None => false,
                };
                if exhausted {
                    self.doc_freqs.remove(term);
                }
            }
            self.total_len -= old.len;
        } else {
            self.slots.insert(id.to_string(), self.docs.len());
            self.docs.push(entry);
        }
    }

    /// BM25 score of `query` against every stored chunk, in insertion
    /// order.
    ///
    /// Scores are non-negative; chunks sharing no terms with the query
    /// score 0. Repeated query tokens contribute once per occurrence.
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub fn score_all(&self, query: &str) -> Vec<(String, f32)> {
        let tokens = tokenize(query);
        let doc_count = self.docs.len();
        if doc_count == 0 {
            return Vec::new();
        }
        let avgdl = self.total_len as f32 / doc_count as f32;

        self.docs
            .iter()
            .map(|doc| {
                let mut score = 0.0f32;
                for token in &tokens {
                    let tf = doc.term_freqs.get(token).copied().unwrap_or(0) as f32;
                    if tf == 0.0 {
                        continue;
                    }
                    let df = self.doc_freqs.get(token).copied().unwrap_or(0) as f32;
                    let idf = (1.0 + (doc_count as f32 - df + 0.5) / (df + 0.5)).ln();
                    let norm = 1.0 - BM25_B + BM25_B * doc.len as f32 / avgdl;
                    score += idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm);
                }
                (doc.id.clone(), score)
            })
            .collect()
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::new()
    }
}
