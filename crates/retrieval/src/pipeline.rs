//! Retrieval pipeline
//!
//! The top-level orchestrator: expand, embed, search both indexes in
//! parallel, fuse, resolve metadata, filter by scope, rerank, truncate.
//! The pipeline is stateless per call; all state lives in the read-only
//! index snapshot and the injected collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use powersync_config::Settings;
use powersync_core::{
    Chunk, EmbeddingOracle, Error, MetadataStore, RelevanceOracle, Result, ScoredChunk,
};

use crate::filter::ScopeFilter;
use crate::fusion::{self, to_rank_entries};
use crate::query_expansion::QueryExpander;
use crate::reranker::Reranker;
use crate::snapshot::{IndexHandle, IndexSnapshot};

/// Hybrid retrieval pipeline.
///
/// Collaborators are injected once at construction and shared by reference.
/// The index handle may be rebuilt concurrently; each query pins the
/// snapshot that was current when it started.
pub struct RetrievalPipeline {
    settings: Settings,
    expander: QueryExpander,
    indexes: Arc<IndexHandle>,
    embedder: Arc<dyn EmbeddingOracle>,
    metadata: Arc<dyn MetadataStore>,
    reranker: Reranker,
}

impl RetrievalPipeline {
    pub fn new(
        settings: Settings,
        indexes: Arc<IndexHandle>,
        embedder: Arc<dyn EmbeddingOracle>,
        relevance: Arc<dyn RelevanceOracle>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let reranker = Reranker::new(relevance, settings.retrieval.oracle_timeout());
        Self {
            settings,
            expander: QueryExpander::power_grid(),
            indexes,
            embedder,
            metadata,
            reranker,
        }
    }

    /// Replace the default power-grid expander with a custom one.
    pub fn with_expander(mut self, expander: QueryExpander) -> Self {
        self.expander = expander;
        self
    }

    /// Run the full hybrid retrieval flow.
    ///
    /// `top_k` falls back to the configured default; `scope` restricts
    /// results to one source document. With no published snapshot the call
    /// returns an empty result rather than failing. An embedding failure
    /// aborts the query with the cause; a reranking failure degrades to the
    /// fused order.
    pub async fn run(
        &self,
        query: &str,
        top_k: Option<usize>,
        scope: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let top_k = top_k.unwrap_or(self.settings.retrieval.top_k_default);

        let snapshot = match self.indexes.snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "retrieval attempted before any snapshot was published");
                return Ok(Vec::new());
            }
        };

        let expanded = self.expander.expand(query);
        let query_vector = self.embed(&expanded).await?;

        let pool = self.settings.retrieval.candidate_pool_size.max(top_k);
        let (vector_hits, lexical_hits) =
            Self::search_both(Arc::clone(&snapshot), query_vector, expanded.clone(), pool).await?;

        let fused = fusion::fuse(
            &[
                ("vector", to_rank_entries(&vector_hits)),
                ("lexical", to_rank_entries(&lexical_hits)),
            ],
            self.settings.retrieval.rrf_k,
        );
        if fused.is_empty() {
            return Ok(Vec::new());
        }

        // resolve fused ids to chunk records, preserving fused order
        let ids: Vec<u64> = fused.iter().map(|candidate| candidate.vector_id).collect();
        let records = self.metadata.fetch_by_vector_ids(&ids).await?;
        let mut by_id: HashMap<u64, Chunk> = records
            .into_iter()
            .map(|chunk| (chunk.vector_id, chunk))
            .collect();

        let mut resolved = Vec::with_capacity(fused.len());
        let mut dropped = 0usize;
        for candidate in &fused {
            match by_id.remove(&candidate.vector_id) {
                Some(chunk) => resolved.push(ScoredChunk {
                    chunk,
                    score: candidate.rrf_score,
                }),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, "fused candidates had no metadata record");
        }

        let scoped = ScopeFilter::apply(resolved, scope);
        let mut reranked = self.reranker.rerank(&expanded, scoped).await;
        reranked.truncate(top_k);
        Ok(reranked)
    }

    /// Vector-only retrieval: chunks with their squared-L2 distance,
    /// ascending (lower is better).
    pub async fn search_dense(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<(Chunk, f32)>> {
        let k = top_k.unwrap_or(self.settings.retrieval.top_k_default);
        let snapshot = self.indexes.snapshot()?;

        let expanded = self.expander.expand(query);
        let query_vector = self.embed(&expanded).await?;

        let hits = tokio::task::spawn_blocking({
            let snapshot = Arc::clone(&snapshot);
            move || snapshot.vector().search(&query_vector, k)
        })
        .await
        .map_err(|err| Error::Search(format!("vector search task failed: {err}")))??;

        let ids: Vec<u64> = hits.iter().map(|(id, _)| *id).collect();
        let records = self.metadata.fetch_by_vector_ids(&ids).await?;
        let mut by_id: HashMap<u64, Chunk> = records
            .into_iter()
            .map(|chunk| (chunk.vector_id, chunk))
            .collect();

        Ok(hits
            .into_iter()
            .filter_map(|(id, distance)| by_id.remove(&id).map(|chunk| (chunk, distance)))
            .collect())
    }

    /// Lexical-only retrieval: chunks with their BM25 score, descending.
    ///
    /// Does not touch the embedding oracle, so it keeps serving while the
    /// oracle is down.
    pub async fn search_lexical(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<(Chunk, f64)>> {
        let k = top_k.unwrap_or(self.settings.retrieval.top_k_default);
        let snapshot = self.indexes.snapshot()?;

        let expanded = self.expander.expand(query);
        let hits = tokio::task::spawn_blocking({
            let snapshot = Arc::clone(&snapshot);
            move || snapshot.lexical().search(&expanded, k)
        })
        .await
        .map_err(|err| Error::Search(format!("lexical search task failed: {err}")))?;

        let ids: Vec<u64> = hits.iter().map(|(id, _)| *id).collect();
        let records = self.metadata.fetch_by_vector_ids(&ids).await?;
        let mut by_id: HashMap<u64, Chunk> = records
            .into_iter()
            .map(|chunk| (chunk.vector_id, chunk))
            .collect();

        Ok(hits
            .into_iter()
            .filter_map(|(id, score)| by_id.remove(&id).map(|chunk| (chunk, score)))
            .collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let timeout = self.settings.retrieval.oracle_timeout();
        let vector = match tokio::time::timeout(timeout, self.embedder.embed(text)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::OracleTimeout {
                    oracle: "embedding",
                    waited_ms: timeout.as_millis() as u64,
                })
            }
        };

        let expected = self.settings.index.vector_dim;
        if vector.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    /// Run the two index searches concurrently over one pinned snapshot.
    async fn search_both(
        snapshot: Arc<IndexSnapshot>,
        query_vector: Vec<f32>,
        query_text: String,
        pool: usize,
    ) -> Result<(Vec<(u64, f32)>, Vec<(u64, f64)>)> {
        let vector_task = tokio::task::spawn_blocking({
            let snapshot = Arc::clone(&snapshot);
            move || snapshot.vector().search(&query_vector, pool)
        });
        let lexical_task = tokio::task::spawn_blocking({
            let snapshot = Arc::clone(&snapshot);
            move || snapshot.lexical().search(&query_text, pool)
        });

        let (vector_hits, lexical_hits) = tokio::join!(vector_task, lexical_task);
        let vector_hits = vector_hits
            .map_err(|err| Error::Search(format!("vector search task failed: {err}")))??;
        let lexical_hits = lexical_hits
            .map_err(|err| Error::Search(format!("lexical search task failed: {err}")))?;

        tracing::debug!(
            vector = vector_hits.len(),
            lexical = lexical_hits.len(),
            "candidate pools retrieved"
        );
        Ok((vector_hits, lexical_hits))
    }
}
