//! Hybrid retrieval with RRF fusion and oracle reranking
//!
//! Features:
//! - Exact squared-L2 vector search over an in-process flat index
//! - BM25 lexical search with reproducible whitespace tokenization
//! - Reciprocal Rank Fusion of both candidate pools
//! - Bilingual (Korean/English) power-grid query expansion
//! - Document-scope filtering of fused candidates
//! - Relevance-oracle reranking with graceful degradation
//! - Atomic snapshot swap for index rebuilds under load
//! - Grounded prompt assembly and retrieval quality metrics

pub mod filter;
pub mod fusion;
pub mod lexical_index;
pub mod metrics;
pub mod pipeline;
pub mod prompt;
pub mod query_expansion;
pub mod reranker;
pub mod snapshot;
pub mod vector_index;

pub use filter::ScopeFilter;
pub use fusion::fuse;
pub use lexical_index::LexicalIndex;
pub use pipeline::RetrievalPipeline;
pub use query_expansion::{QueryExpander, QueryExpansionConfig};
pub use reranker::Reranker;
pub use snapshot::{IndexHandle, IndexSnapshot};
pub use vector_index::VectorIndex;
