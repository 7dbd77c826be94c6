//! Error taxonomy for the retrieval engine

use thiserror::Error;

/// Errors surfaced by the retrieval engine.
///
/// Recovery policy is decided at the pipeline boundary: index-level errors
/// are either fatal to the call (`DimensionMismatch`, `CorpusMismatch`) or
/// downgraded to an empty result set (`IndexUnavailable`); oracle errors
/// either abort the query (embedding) or degrade to the fused order
/// (reranking).
#[derive(Error, Debug)]
pub enum Error {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("corpus mismatch: vector index holds {vectors} entries, lexical corpus holds {documents}")]
    CorpusMismatch { vectors: usize, documents: usize },

    #[error("{oracle} oracle timed out after {waited_ms}ms")]
    OracleTimeout { oracle: &'static str, waited_ms: u64 },

    #[error("{oracle} oracle unavailable: {message}")]
    OracleUnavailable { oracle: &'static str, message: String },

    #[error("search error: {0}")]
    Search(String),

    #[error("metadata store error: {0}")]
    Metadata(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
