//! Relevance-oracle reranking
//!
//! The precision pass over fused candidates: one batched call to the
//! external relevance oracle, then a re-sort by its scores. The oracle is
//! the highest-latency collaborator in the pipeline, so the call runs under
//! a timeout, and any failure degrades to the fused order instead of
//! failing the query.

use std::sync::Arc;
use std::time::Duration;

use powersync_core::{RelevanceOracle, ScoredChunk};

pub struct Reranker {
    oracle: Arc<dyn RelevanceOracle>,
    timeout: Duration,
}

impl Reranker {
    pub fn new(oracle: Arc<dyn RelevanceOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Re-sort candidates by descending oracle relevance.
    ///
    /// Candidates arrive in fused order; on success their scores are
    /// replaced with the oracle's and ties keep the fused order (stable
    /// sort). Empty input returns without calling the oracle. Oracle errors
    /// and timeouts return the input unchanged.
    pub async fn rerank(&self, query: &str, candidates: Vec<ScoredChunk>) -> Vec<ScoredChunk> {
        if candidates.is_empty() {
            return candidates;
        }

        let texts: Vec<String> = candidates
            .iter()
            .map(|candidate| candidate.chunk.text.clone())
            .collect();

        let scores = match tokio::time::timeout(self.timeout, self.oracle.score(query, &texts)).await
        {
            Ok(Ok(scores)) if scores.len() == candidates.len() => scores,
            Ok(Ok(scores)) => {
                tracing::warn!(
                    expected = candidates.len(),
                    received = scores.len(),
                    "relevance oracle returned wrong score count, keeping fused order"
                );
                return candidates;
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "relevance oracle failed, keeping fused order");
                return candidates;
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "relevance oracle timed out, keeping fused order"
                );
                return candidates;
            }
        };

        let mut reranked: Vec<ScoredChunk> = candidates
            .into_iter()
            .zip(scores)
            .map(|(mut candidate, score)| {
                candidate.score = f64::from(score);
                candidate
            })
            .collect();

        reranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        reranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use powersync_core::{Chunk, Error, Result};

    fn candidates(texts: &[&str]) -> Vec<ScoredChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| ScoredChunk {
                chunk: Chunk::new(format!("c-{i}"), i as u64, "doc.pdf", *text),
                score: 1.0 / (i + 1) as f64,
            })
            .collect()
    }

    struct FixedOracle {
        scores: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedOracle {
        fn new(scores: Vec<f32>) -> Self {
            Self {
                scores,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RelevanceOracle for FixedOracle {
        async fn score(&self, _query: &str, _candidates: &[String]) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.scores.clone())
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl RelevanceOracle for FailingOracle {
        async fn score(&self, _query: &str, _candidates: &[String]) -> Result<Vec<f32>> {
            Err(Error::OracleUnavailable {
                oracle: "relevance",
                message: "connection refused".to_string(),
            })
        }
    }

    struct SlowOracle;

    #[async_trait]
    impl RelevanceOracle for SlowOracle {
        async fn score(&self, _query: &str, _candidates: &[String]) -> Result<Vec<f32>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_reorders_by_oracle_score() {
        let oracle = Arc::new(FixedOracle::new(vec![0.1, 0.9, 0.5]));
        let reranker = Reranker::new(oracle, Duration::from_secs(1));

        let reranked = reranker
            .rerank("query", candidates(&["first", "second", "third"]))
            .await;

        let ids: Vec<u64> = reranked.iter().map(|c| c.chunk.vector_id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert_eq!(reranked[0].score, 0.9f32 as f64);
    }

    #[tokio::test]
    async fn test_ties_keep_fused_order() {
        let oracle = Arc::new(FixedOracle::new(vec![0.5, 0.5, 0.5]));
        let reranker = Reranker::new(oracle, Duration::from_secs(1));

        let reranked = reranker
            .rerank("query", candidates(&["first", "second", "third"]))
            .await;

        let ids: Vec<u64> = reranked.iter().map(|c| c.chunk.vector_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_oracle_failure_degrades_to_fused_order() {
        let reranker = Reranker::new(Arc::new(FailingOracle), Duration::from_secs(1));

        let input = candidates(&["first", "second"]);
        let reranked = reranker.rerank("query", input.clone()).await;
        assert_eq!(reranked, input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oracle_timeout_degrades_to_fused_order() {
        let reranker = Reranker::new(Arc::new(SlowOracle), Duration::from_millis(50));

        let input = candidates(&["first", "second"]);
        let reranked = reranker.rerank("query", input.clone()).await;
        assert_eq!(reranked, input);
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_oracle() {
        let oracle = Arc::new(FixedOracle::new(Vec::new()));
        let reranker = Reranker::new(
            Arc::clone(&oracle) as Arc<dyn RelevanceOracle>,
            Duration::from_secs(1),
        );

        let reranked = reranker.rerank("query", Vec::new()).await;
        assert!(reranked.is_empty());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_score_count_degrades_to_fused_order() {
        let oracle = Arc::new(FixedOracle::new(vec![0.9]));
        let reranker = Reranker::new(oracle, Duration::from_secs(1));

        let input = candidates(&["first", "second"]);
        let reranked = reranker.rerank("query", input.clone()).await;
        assert_eq!(reranked, input);
    }
}
