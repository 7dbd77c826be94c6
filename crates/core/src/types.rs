//! Chunk and ranking types shared across the retrieval crates.

use serde::{Deserialize, Serialize};

/// An immutable unit of retrievable text.
///
/// - `chunk_id`: opaque identifier assigned at ingestion time, never reused
/// - `vector_id`: dense integer key assigned by the vector index at insertion;
///   unites the vector entry with its lexical-corpus entry and metadata record
/// - `document_name`: logical source document, used for scope filtering
/// - `text`: payload, used for lexical tokenization and as reranker input
/// - `page_or_section`: human-readable locator, carried through but never
///   consulted for ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub vector_id: u64,
    pub document_name: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_or_section: Option<String>,
}

impl Chunk {
    pub fn new(
        chunk_id: impl Into<String>,
        vector_id: u64,
        document_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            vector_id,
            document_name: document_name.into(),
            text: text.into(),
            page_or_section: None,
        }
    }

    pub fn with_page_or_section(mut self, locator: impl Into<String>) -> Self {
        self.page_or_section = Some(locator.into());
        self
    }
}

/// Position of a candidate within a single retrieval method's result list.
///
/// Ranks are dense positive integers starting at 1 (best), with no gaps or
/// ties within one method's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankEntry {
    pub vector_id: u64,
    pub rank: usize,
}

impl RankEntry {
    pub fn new(vector_id: u64, rank: usize) -> Self {
        Self { vector_id, rank }
    }
}

/// A candidate after rank fusion.
///
/// The score is strictly positive and comparable only within one fusion
/// call; it has no meaning across queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedCandidate {
    pub vector_id: u64,
    pub rrf_score: f64,
}

/// Final pipeline result: a chunk with its relevance score.
///
/// The score is the relevance oracle's output when reranking succeeded, or
/// the fused RRF score when the pipeline degraded to fused order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}
