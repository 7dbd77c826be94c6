//! Index snapshots and atomic publication
//!
//! The vector and lexical indexes are built together, once per corpus
//! version, and are read-only while serving. [`IndexHandle`] owns the
//! published snapshot behind a pointer swap: queries clone the current
//! `Arc` under a brief read lock, a rebuild constructs the replacement off
//! to the side and swaps it in atomically, so in-flight queries always see
//! one consistent snapshot and a failed rebuild leaves the old one serving.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use powersync_config::Settings;
use powersync_core::{Error, Result};

use crate::lexical_index::LexicalIndex;
use crate::vector_index::VectorIndex;

/// An immutable, index-aligned pair of vector and lexical indexes.
///
/// The i-th inserted vector and the i-th corpus document share the same
/// vector_id; construction fails rather than produce misaligned indexes.
#[derive(Debug)]
pub struct IndexSnapshot {
    vector: VectorIndex,
    lexical: LexicalIndex,
}

impl IndexSnapshot {
    /// Build both indexes from an ordered corpus.
    ///
    /// `texts[i]` must be the text embedded as `vectors[i]`; a length
    /// disagreement is a [`Error::CorpusMismatch`] and nothing is built.
    pub fn build(texts: Vec<String>, vectors: Vec<Vec<f32>>, settings: &Settings) -> Result<Self> {
        if texts.len() != vectors.len() {
            return Err(Error::CorpusMismatch {
                vectors: vectors.len(),
                documents: texts.len(),
            });
        }

        let mut vector = VectorIndex::new(settings.index.vector_dim);
        let ids = vector.insert(&vectors)?;

        let corpus: Vec<(u64, String)> = ids.into_iter().zip(texts).collect();
        let retrieval = &settings.retrieval;
        let mut lexical =
            LexicalIndex::with_params(retrieval.bm25_k1, retrieval.bm25_b, retrieval.bm25_epsilon);
        lexical.build(&corpus);

        tracing::info!(chunks = corpus.len(), "index snapshot built");
        Ok(Self { vector, lexical })
    }

    /// Recreate a snapshot from a persisted vector index and its corpus.
    ///
    /// The corpus must be the same ordered text sequence the persisted
    /// vectors were built from; a size disagreement fails with
    /// [`Error::CorpusMismatch`].
    pub fn open(path: &Path, texts: Vec<String>, settings: &Settings) -> Result<Self> {
        let vector = VectorIndex::load(path)?;
        if vector.len() != texts.len() {
            return Err(Error::CorpusMismatch {
                vectors: vector.len(),
                documents: texts.len(),
            });
        }

        let corpus: Vec<(u64, String)> = (0u64..).zip(texts).collect();
        let retrieval = &settings.retrieval;
        let mut lexical =
            LexicalIndex::with_params(retrieval.bm25_k1, retrieval.bm25_b, retrieval.bm25_epsilon);
        lexical.build(&corpus);

        tracing::info!(chunks = vector.len(), path = %path.display(), "index snapshot loaded");
        Ok(Self { vector, lexical })
    }

    pub fn vector(&self) -> &VectorIndex {
        &self.vector
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    /// Number of chunks indexed (identical for both sides by construction).
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Persist the vector side to `path`; the lexical side is rebuilt from
    /// the corpus on [`IndexSnapshot::open`].
    pub fn save(&self, path: &Path) -> Result<()> {
        self.vector.save(path)
    }
}

/// Shared handle to the currently published snapshot.
#[derive(Default)]
pub struct IndexHandle {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl IndexHandle {
    /// Create a handle with no published snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: IndexSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| Error::IndexUnavailable("no index snapshot published".to_string()))
    }

    /// Atomically replace the published snapshot.
    pub fn publish(&self, snapshot: IndexSnapshot) {
        *self.current.write() = Some(Arc::new(snapshot));
    }

    /// Rebuild both indexes and publish the result.
    ///
    /// Any build failure (including a corpus size mismatch) leaves the
    /// previously published snapshot serving.
    pub fn rebuild(
        &self,
        texts: Vec<String>,
        vectors: Vec<Vec<f32>>,
        settings: &Settings,
    ) -> Result<()> {
        let snapshot = IndexSnapshot::build(texts, vectors, settings)?;
        self.publish(snapshot);
        Ok(())
    }
}
