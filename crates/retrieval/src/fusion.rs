//! Reciprocal Rank Fusion
//!
//! Combines ranked lists from multiple retrieval methods into one ranking
//! using rank positions only, never raw score magnitudes:
//! `score(d) = Σ 1/(k + rank_m(d))` over every method that ranked `d`.
//! A method that did not rank a candidate contributes nothing; appearing in
//! a single list is not penalized beyond absence from the others.

use std::collections::HashMap;

use powersync_core::{FusedCandidate, RankEntry};

/// Fuse per-method rank lists into a single descending-score ranking.
///
/// `k` is the smoothing constant (60 is the usual choice); higher values
/// flatten the advantage of top ranks. Equal fused scores order by ascending
/// vector_id so repeated calls are reproducible. Empty inputs fuse to an
/// empty ranking.
/// Convert a best-first hit list into dense 1-based rank entries.
pub fn to_rank_entries<S>(hits: &[(u64, S)]) -> Vec<RankEntry> {
    hits.iter()
        .enumerate()
        .map(|(i, (id, _))| RankEntry::new(*id, i + 1))
        .collect()
}

pub fn fuse(method_ranks: &[(&str, Vec<RankEntry>)], k: f64) -> Vec<FusedCandidate> {
    let mut scores: HashMap<u64, f64> = HashMap::new();

    for (method, entries) in method_ranks {
        tracing::debug!(method, candidates = entries.len(), "fusing rank list");
        for entry in entries {
            *scores.entry(entry.vector_id).or_default() += 1.0 / (k + entry.rank as f64);
        }
    }

    let mut fused: Vec<FusedCandidate> = scores
        .into_iter()
        .map(|(vector_id, rrf_score)| FusedCandidate {
            vector_id,
            rrf_score,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.rrf_score
            .total_cmp(&a.rrf_score)
            .then(a.vector_id.cmp(&b.vector_id))
    });
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(u64, usize)]) -> Vec<RankEntry> {
        pairs
            .iter()
            .map(|&(id, rank)| RankEntry::new(id, rank))
            .collect()
    }

    #[test]
    fn test_overlapping_candidate_wins() {
        // vector ranks A=1, B=2; lexical ranks B=1, C=2
        let fused = fuse(
            &[
                ("vector", entries(&[(0, 1), (1, 2)])),
                ("lexical", entries(&[(1, 1), (2, 2)])),
            ],
            60.0,
        );

        let ids: Vec<u64> = fused.iter().map(|c| c.vector_id).collect();
        assert_eq!(ids, vec![1, 0, 2]);

        let eps = 1e-12;
        assert!((fused[0].rrf_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < eps);
        assert!((fused[1].rrf_score - 1.0 / 61.0).abs() < eps);
        assert!((fused[2].rrf_score - 1.0 / 62.0).abs() < eps);
    }

    #[test]
    fn test_disjoint_lists_union_rank() {
        let fused = fuse(
            &[
                ("vector", entries(&[(10, 1)])),
                ("lexical", entries(&[(20, 2)])),
            ],
            60.0,
        );

        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].vector_id, 10);
        assert_eq!(fused[1].vector_id, 20);
        // sole-method candidates keep their full contribution
        assert!((fused[0].rrf_score - 1.0 / 61.0).abs() < 1e-12);
        assert!((fused[1].rrf_score - 1.0 / 62.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_scores_order_by_id() {
        let fused = fuse(
            &[
                ("vector", entries(&[(42, 1)])),
                ("lexical", entries(&[(7, 1)])),
            ],
            60.0,
        );

        assert_eq!(fused[0].vector_id, 7);
        assert_eq!(fused[1].vector_id, 42);
        assert_eq!(fused[0].rrf_score, fused[1].rrf_score);
    }

    #[test]
    fn test_empty_lists_fuse_to_empty() {
        assert!(fuse(&[], 60.0).is_empty());
        assert!(fuse(&[("vector", Vec::new()), ("lexical", Vec::new())], 60.0).is_empty());
    }

    #[test]
    fn test_smoothing_constant_is_configurable() {
        let lists = [("vector", entries(&[(0, 1)]))];
        let tight = fuse(&lists, 1.0);
        let loose = fuse(&lists, 60.0);

        assert!((tight[0].rrf_score - 0.5).abs() < 1e-12);
        assert!(tight[0].rrf_score > loose[0].rrf_score);
    }

    #[test]
    fn test_to_rank_entries_dense_from_one() {
        let entries = to_rank_entries(&[(9, 2.0), (4, 1.0), (6, 0.5)]);
        assert_eq!(entries[0], RankEntry::new(9, 1));
        assert_eq!(entries[1], RankEntry::new(4, 2));
        assert_eq!(entries[2], RankEntry::new(6, 3));
    }

    #[test]
    fn test_scores_are_strictly_positive() {
        let fused = fuse(
            &[("vector", entries(&[(0, 1), (1, 2), (2, 3)]))],
            60.0,
        );
        assert!(fused.iter().all(|c| c.rrf_score > 0.0));
    }
}
