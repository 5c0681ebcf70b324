//! Weighted score fusion for hybrid retrieval.
//!
//! The lexical and semantic channels each produce a score mapping over
//! chunk ids. Fusion combines them over the union of ids as
//! `combined = alpha * semantic + (1 - alpha) * lexical`, where an id
//! missing from one channel contributes 0 from that channel.
//!
//! Candidates are collected in lexical order first (the lexical channel
//! scores the whole partition in insertion order), then semantic-only
//! arrivals. The descending sort is stable, so equal combined scores keep
//! that order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// A fused candidate with per-channel provenance.
#[derive(Debug, Clone)]
pub struct FusedScore {
    /// Chunk identifier
    pub id: String,
    /// Combined weighted score
    pub score: f32,
    /// Cosine similarity, if the semantic channel ranked this id
    pub semantic: Option<f32>,
    /// BM25 score, if the lexical channel scored this id
    pub lexical: Option<f32>,
}

/// Merges two score lists into a ranking over their union.
///
/// Candidates whose combined score is not strictly positive are dropped,
/// so the ranking only ever contains ids at least one channel actually
/// matched.
pub fn weighted_score_fusion(
    lexical: &[(String, f32)],
    semantic: &[(String, f32)],
    alpha: f32,
) -> Vec<FusedScore> {
    let semantic_scores: HashMap<&str, f32> = semantic
        .iter()
        .map(|(id, score)| (id.as_str(), *score))
        .collect();

    let mut candidates: Vec<FusedScore> = Vec::with_capacity(lexical.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(lexical.len());
    for (id, lexical_score) in lexical {
        seen.insert(id.as_str());
        let semantic_score = semantic_scores.get(id.as_str()).copied();
        candidates.push(FusedScore {
            id: id.clone(),
            score: alpha * semantic_score.unwrap_or(0.0) + (1.0 - alpha) * *lexical_score,
            semantic: semantic_score,
            lexical: Some(*lexical_score),
        });
    }
    for (id, semantic_score) in semantic {
        if seen.contains(id.as_str()) {
            continue;
        }
        candidates.push(FusedScore {
            id: id.clone(),
            score: alpha * *semantic_score,
            semantic: Some(*semantic_score),
            lexical: None,
        });
    }

    candidates.retain(|candidate| candidate.score > 0.0);
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates
}
