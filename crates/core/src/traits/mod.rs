//! Collaborator traits for the external oracles the engine consumes.

mod oracle;
mod store;

pub use oracle::{EmbeddingOracle, RelevanceOracle};
pub use store::MetadataStore;
