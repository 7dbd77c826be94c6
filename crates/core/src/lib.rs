//! Core traits and types for the retrieval engine
//!
//! This crate provides the vocabulary shared by all other crates:
//! - Chunk and ranking types
//! - Error taxonomy
//! - Collaborator traits for the external oracles (embedding, relevance,
//!   metadata)

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Chunk, FusedCandidate, RankEntry, ScoredChunk};

pub use traits::{EmbeddingOracle, MetadataStore, RelevanceOracle};
