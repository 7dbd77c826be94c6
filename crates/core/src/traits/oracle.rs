//! External scoring oracles
//!
//! Both oracles are black boxes with meaningful latency (network or model
//! inference); the pipeline wraps each call in a timeout and applies its
//! documented degradation policy on failure.

use async_trait::async_trait;

use crate::Result;

/// Text embedding oracle.
///
/// Deterministic for a fixed model version; the returned vector dimension is
/// fixed for the oracle's lifetime and must match the vector index it feeds.
///
/// # Example
///
/// ```ignore
/// let embedding = embedder.embed("transformer insulating oil").await?;
/// assert_eq!(embedding.len(), embedder.dim());
/// ```
#[async_trait]
pub trait EmbeddingOracle: Send + Sync {
    /// Embed a single text into a fixed-dimension `f32` vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this oracle produces.
    fn dim(&self) -> usize;
}

/// Relevance scoring oracle (cross-encoder reranker).
///
/// Scores carry no fixed range guarantee; higher means more relevant, and
/// scores are only comparable within one call.
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    /// Score each candidate text against the query, one score per candidate
    /// in input order.
    async fn score(&self, query: &str, candidates: &[String]) -> Result<Vec<f32>>;
}
