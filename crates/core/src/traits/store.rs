//! Chunk metadata store

use async_trait::async_trait;

use crate::{Chunk, Result};

/// Key-value store resolving vector ids to chunk records.
///
/// Result order is NOT guaranteed to follow the input order; callers re-sort.
/// Ids with no record are simply absent from the result, never an error.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch the chunk records for the given vector ids.
    async fn fetch_by_vector_ids(&self, ids: &[u64]) -> Result<Vec<Chunk>>;
}
