//! Retrieval quality metrics
//!
//! Standard rank-aware evaluation metrics over retrieved vs. relevant
//! document names, all returning values in [0, 1]. Retrieval returns
//! chunks, but relevance judgments are per document, so evaluation first
//! collapses the chunk list to unique documents at their best rank.

use std::collections::HashSet;

use powersync_core::ScoredChunk;

/// Unique document names in result order (first occurrence wins).
pub fn unique_documents(results: &[ScoredChunk]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut documents = Vec::new();
    for result in results {
        if seen.insert(&result.chunk.document_name) {
            documents.push(result.chunk.document_name.clone());
        }
    }
    documents
}

/// Whether any relevant document was retrieved at all.
pub fn hit(retrieved: &[String], relevant: &HashSet<String>) -> bool {
    retrieved.iter().any(|doc| relevant.contains(doc))
}

/// Fraction of the first `k` retrieved documents that are relevant.
pub fn precision_at_k(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|doc| relevant.contains(*doc))
        .count();
    hits as f64 / k as f64
}

/// Fraction of the relevant documents found in the first `k` retrieved.
pub fn recall_at_k(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|doc| relevant.contains(*doc))
        .count();
    hits as f64 / relevant.len() as f64
}

/// Harmonic mean of precision@k and recall@k.
pub fn f1_at_k(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    let precision = precision_at_k(retrieved, relevant, k);
    let recall = recall_at_k(retrieved, relevant, k);
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

/// Average of precision at each relevant position, over total relevant.
pub fn average_precision(retrieved: &[String], relevant: &HashSet<String>) -> f64 {
    if relevant.is_empty() || retrieved.is_empty() {
        return 0.0;
    }

    let mut found = 0usize;
    let mut precision_sum = 0.0;
    for (i, doc) in retrieved.iter().enumerate() {
        if relevant.contains(doc) {
            found += 1;
            precision_sum += found as f64 / (i + 1) as f64;
        }
    }

    if found == 0 {
        return 0.0;
    }
    precision_sum / relevant.len() as f64
}

/// Normalized discounted cumulative gain with binary relevance; the ideal
/// ranking is truncated at `k`.
pub fn ndcg_at_k(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    let dcg: f64 = retrieved
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, doc)| relevant.contains(*doc))
        .map(|(i, _)| 1.0 / ((i + 2) as f64).log2())
        .sum();

    let ideal = relevant.len().min(k);
    let idcg: f64 = (0..ideal).map(|i| 1.0 / ((i + 2) as f64).log2()).sum();

    if idcg == 0.0 {
        return if dcg == 0.0 { 1.0 } else { 0.0 };
    }
    (dcg / idcg).min(1.0)
}

/// Reciprocal of the rank of the first relevant document (0 when none).
pub fn reciprocal_rank(retrieved: &[String], relevant: &HashSet<String>) -> f64 {
    retrieved
        .iter()
        .position(|doc| relevant.contains(doc))
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

/// All metrics for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub ndcg: f64,
    pub average_precision: f64,
    pub reciprocal_rank: f64,
}

pub fn calculate_all(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> QueryMetrics {
    QueryMetrics {
        precision: precision_at_k(retrieved, relevant, k),
        recall: recall_at_k(retrieved, relevant, k),
        f1: f1_at_k(retrieved, relevant, k),
        ndcg: ndcg_at_k(retrieved, relevant, k),
        average_precision: average_precision(retrieved, relevant),
        reciprocal_rank: reciprocal_rank(retrieved, relevant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powersync_core::Chunk;

    fn docs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn relevant(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_perfect_ranking() {
        let retrieved = docs(&["doc2", "doc4", "doc6", "doc1", "doc3"]);
        let rel = relevant(&["doc2", "doc4", "doc6"]);

        let metrics = calculate_all(&retrieved, &rel, 5);
        assert_eq!(metrics.precision, 3.0 / 5.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.ndcg, 1.0);
        assert_eq!(metrics.average_precision, 1.0);
        assert_eq!(metrics.reciprocal_rank, 1.0);
    }

    #[test]
    fn test_mixed_ranking() {
        let retrieved = docs(&["doc1", "doc2", "doc3", "doc4", "doc5"]);
        let rel = relevant(&["doc2", "doc4", "doc6"]);

        let metrics = calculate_all(&retrieved, &rel, 5);
        assert_eq!(metrics.precision, 2.0 / 5.0);
        assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.reciprocal_rank, 0.5);
        // AP = (1/2 + 2/4) / 3
        assert!((metrics.average_precision - 1.0 / 3.0).abs() < 1e-12);
        assert!(metrics.ndcg > 0.0 && metrics.ndcg < 1.0);
    }

    #[test]
    fn test_no_relevant_retrieved() {
        let retrieved = docs(&["doc1", "doc3"]);
        let rel = relevant(&["doc2"]);

        let metrics = calculate_all(&retrieved, &rel, 2);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert_eq!(metrics.ndcg, 0.0);
        assert_eq!(metrics.reciprocal_rank, 0.0);
        assert!(!hit(&retrieved, &rel));
    }

    #[test]
    fn test_empty_relevant_set() {
        let retrieved = docs(&["doc1"]);
        let rel = relevant(&[]);

        assert_eq!(recall_at_k(&retrieved, &rel, 1), 0.0);
        assert_eq!(average_precision(&retrieved, &rel), 0.0);
        // no relevant docs and none retrieved relevant: ideal outcome
        assert_eq!(ndcg_at_k(&retrieved, &rel, 1), 1.0);
    }

    #[test]
    fn test_unique_documents_keeps_first_occurrence() {
        let results: Vec<ScoredChunk> = [
            (0, "a.pdf"),
            (1, "b.pdf"),
            (2, "a.pdf"),
            (3, "c.pdf"),
        ]
        .into_iter()
        .map(|(id, doc)| ScoredChunk {
            chunk: Chunk::new(format!("c-{id}"), id, doc, "text"),
            score: 0.0,
        })
        .collect();

        assert_eq!(unique_documents(&results), docs(&["a.pdf", "b.pdf", "c.pdf"]));
    }

    #[test]
    fn test_ndcg_rewards_earlier_hits() {
        let rel = relevant(&["doc1"]);
        let early = ndcg_at_k(&docs(&["doc1", "doc2"]), &rel, 2);
        let late = ndcg_at_k(&docs(&["doc2", "doc1"]), &rel, 2);
        assert!(early > late);
        assert_eq!(early, 1.0);
    }
}
