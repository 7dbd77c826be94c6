//! Grounded prompt assembly
//!
//! Deterministic formatting of retrieved chunks into an LLM prompt. Pure
//! string building; generation itself happens outside this crate.

use powersync_core::Chunk;

/// Format retrieved chunks as a numbered context block.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Document {}] {}\n{}", i + 1, chunk.document_name, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build a grounded question-answering prompt from retrieved chunks.
pub fn build_prompt(question: &str, chunks: &[Chunk]) -> String {
    format!(
        "You are a helpful assistant. Use the provided context to answer the question.\n\
         \n\
         Context:\n\
         {}\n\
         \n\
         Question: {}\n\
         \n\
         Answer:",
        build_context(chunks),
        question
    )
}
