//! Candidate scope filtering

use powersync_core::ScoredChunk;

/// Restricts fused candidates to a single source document.
///
/// Applied after fusion and before reranking. Never reorders and never
/// fails: without a scope it is the identity, and an empty result is a
/// valid outcome.
pub struct ScopeFilter;

impl ScopeFilter {
    pub fn apply(candidates: Vec<ScoredChunk>, scope: Option<&str>) -> Vec<ScoredChunk> {
        match scope {
            None => candidates,
            Some(document) => candidates
                .into_iter()
                .filter(|candidate| candidate.chunk.document_name == document)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powersync_core::Chunk;

    fn candidates() -> Vec<ScoredChunk> {
        [
            (0, "grid_code.pdf"),
            (1, "market_rules.pdf"),
            (2, "grid_code.pdf"),
            (3, "maintenance.pdf"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (id, doc))| ScoredChunk {
            chunk: Chunk::new(format!("c-{id}"), id, doc, "text"),
            score: 1.0 - i as f64 * 0.1,
        })
        .collect()
    }

    #[test]
    fn test_no_scope_is_identity() {
        let input = candidates();
        let output = ScopeFilter::apply(input.clone(), None);
        assert_eq!(output, input);
    }

    #[test]
    fn test_scope_retains_matching_document_in_order() {
        let output = ScopeFilter::apply(candidates(), Some("grid_code.pdf"));

        let ids: Vec<u64> = output.iter().map(|c| c.chunk.vector_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_unknown_scope_yields_empty() {
        let output = ScopeFilter::apply(candidates(), Some("unknown.pdf"));
        assert!(output.is_empty());
    }
}
