//! Term-frequency lexical index
//!
//! BM25 ranking over a tokenized corpus. Tokenization is intentionally
//! minimal (lower-case, whitespace split, no stemming or stop words) so
//! that scores are reproducible across implementations. Scoring follows the
//! Okapi variant: idf is floored at `epsilon * average_idf` for terms that
//! appear in more than half the corpus, which would otherwise go negative.

use std::collections::HashMap;

pub const DEFAULT_K1: f64 = 1.5;
pub const DEFAULT_B: f64 = 0.75;
pub const DEFAULT_EPSILON: f64 = 0.25;

#[derive(Debug)]
pub struct LexicalIndex {
    k1: f64,
    b: f64,
    epsilon: f64,
    ids: Vec<u64>,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_len: Vec<usize>,
    idf: HashMap<String, f64>,
    avgdl: f64,
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_K1, DEFAULT_B, DEFAULT_EPSILON)
    }

    pub fn with_params(k1: f64, b: f64, epsilon: f64) -> Self {
        Self {
            k1,
            b,
            epsilon,
            ids: Vec::new(),
            term_freqs: Vec::new(),
            doc_len: Vec::new(),
            idf: HashMap::new(),
            avgdl: 0.0,
        }
    }

    /// Number of documents in the corpus.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// (Re)build the index over an ordered corpus of (vector_id, text).
    ///
    /// An empty corpus builds trivially; searching it returns nothing.
    pub fn build(&mut self, corpus: &[(u64, String)]) {
        self.ids = corpus.iter().map(|(id, _)| *id).collect();
        self.term_freqs = Vec::with_capacity(corpus.len());
        self.doc_len = Vec::with_capacity(corpus.len());

        // document frequency per term
        let mut doc_count: HashMap<String, usize> = HashMap::new();

        for (_, text) in corpus {
            let tokens = tokenize(text);
            self.doc_len.push(tokens.len());

            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_count.entry(term.clone()).or_insert(0) += 1;
            }
            self.term_freqs.push(freqs);
        }

        let total_len: usize = self.doc_len.iter().sum();
        self.avgdl = if corpus.is_empty() {
            0.0
        } else {
            total_len as f64 / corpus.len() as f64
        };

        self.idf = compute_idf(&doc_count, corpus.len(), self.epsilon);
    }

    /// Return up to `k` documents by descending BM25 score.
    ///
    /// Equal scores order by ascending vector_id. Trailing zero-score
    /// entries are kept, so the result length is `min(k, corpus size)`.
    pub fn search(&self, query: &str, k: usize) -> Vec<(u64, f64)> {
        if self.is_empty() || k == 0 {
            return Vec::new();
        }

        let tokens = tokenize(query);
        let mut scored: Vec<(u64, f64)> = self
            .ids
            .iter()
            .enumerate()
            .map(|(doc, &id)| {
                let dl = self.doc_len[doc] as f64;
                let norm = self.k1 * (1.0 - self.b + self.b * dl / self.avgdl);

                let mut score = 0.0;
                for token in &tokens {
                    let tf = *self.term_freqs[doc].get(token).unwrap_or(&0) as f64;
                    if tf == 0.0 {
                        continue;
                    }
                    let idf = self.idf.get(token).copied().unwrap_or(0.0);
                    score += idf * (tf * (self.k1 + 1.0)) / (tf + norm);
                }
                (id, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}

/// The fixed tokenization policy: lower-case, whitespace split.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn compute_idf(
    doc_count: &HashMap<String, usize>,
    corpus_size: usize,
    epsilon: f64,
) -> HashMap<String, f64> {
    if doc_count.is_empty() {
        return HashMap::new();
    }

    let mut idf: HashMap<String, f64> = HashMap::with_capacity(doc_count.len());
    let mut idf_sum = 0.0;
    let mut negative: Vec<&String> = Vec::new();

    for (term, &freq) in doc_count {
        let value = (corpus_size as f64 - freq as f64 + 0.5).ln() - (freq as f64 + 0.5).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term);
        }
        idf.insert(term.clone(), value);
    }

    let floor = epsilon * (idf_sum / idf.len() as f64);
    for term in negative {
        idf.insert(term.clone(), floor);
    }

    idf
}
