use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::tokenizer::tokenize;
use crate::{DocId, Posting, TermId};
use std::collections::HashMap;

/// Sparse unit-length tf-idf vector, entries sorted by term id.
pub type SparseVector = Vec<(TermId, f64)>;

/// Read-only tf-idf index over one corpus snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceIndex {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
    postings: Vec<Vec<Posting>>, // by term id, sorted by doc_id
}

impl RelevanceIndex {
    /// Build an index over `corpus`. An empty corpus yields an empty index.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut tf_docs: Vec<Vec<(TermId, u32)>> = Vec::with_capacity(corpus.len());

        for record in corpus.iter() {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in tokenize(record.headline()) {
                let next = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert_with(|| {
                    df.push(0);
                    next
                });
                let count = tf_counts.entry(tid).or_insert(0);
                if *count == 0 {
                    df[tid as usize] += 1;
                }
                *count += 1;
            }
            let mut tf: Vec<(TermId, u32)> = tf_counts.into_iter().collect();
            tf.sort_unstable_by_key(|(tid, _)| *tid);
            tf_docs.push(tf);
        }

        let n = corpus.len() as f64;
        let idf: Vec<f64> = df.iter().map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0).collect();

        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); dictionary.len()];
        let mut vectors: Vec<SparseVector> = Vec::with_capacity(tf_docs.len());
        for (doc_id, tf) in tf_docs.into_iter().enumerate() {
            let weighted: SparseVector = tf.into_iter().map(|(tid, c)| (tid, c as f64 * idf[tid as usize])).collect();
            let vector = normalize(weighted);
            for &(tid, weight) in &vector {
                postings[tid as usize].push(Posting { doc_id: doc_id as DocId, weight });
            }
            vectors.push(vector);
        }

        let index = Self { dictionary, df, idf, vectors, postings };
        index.check(corpus)?;
        tracing::debug!(num_docs = index.num_docs(), num_terms = index.num_terms(), "built relevance index");
        Ok(index)
    }

    fn check(&self, corpus: &Corpus) -> Result<()> {
        if self.vectors.len() != corpus.len() {
            return Err(Error::Build(format!(
                "{} document vectors for {} records",
                self.vectors.len(),
                corpus.len()
            )));
        }
        if self.idf.len() != self.dictionary.len() || self.df.len() != self.dictionary.len() {
            return Err(Error::Build("idf table does not match vocabulary".into()));
        }
        if self.idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(Error::Build("non-finite or non-positive idf weight".into()));
        }
        if self.vectors.iter().flatten().any(|(_, w)| !w.is_finite()) {
            return Err(Error::Build("non-finite document weight".into()));
        }
        Ok(())
    }

    /// Weight `text` with this index's idf table and L2-normalize it.
    /// Terms outside the vocabulary contribute nothing.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let mut tf: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(text) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf.entry(tid).or_insert(0) += 1;
            }
        }
        let mut weighted: SparseVector =
            tf.into_iter().map(|(tid, c)| (tid, c as f64 * self.idf[tid as usize])).collect();
        weighted.sort_unstable_by_key(|(tid, _)| *tid);
        normalize(weighted)
    }

    /// Cosine similarity of a unit query vector against every document.
    pub fn scores(&self, query: &SparseVector) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.num_docs()];
        for &(tid, q_w) in query {
            for p in &self.postings[tid as usize] {
                scores[p.doc_id as usize] += p.weight * q_w;
            }
        }
        scores
    }

    pub fn num_docs(&self) -> usize { self.vectors.len() }
    pub fn num_terms(&self) -> usize { self.dictionary.len() }
    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }
    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }
    pub fn idf(&self, tid: TermId) -> Option<f64> { self.idf.get(tid as usize).copied() }
    pub fn df(&self, tid: TermId) -> Option<u32> { self.df.get(tid as usize).copied() }
    pub fn vector(&self, doc_id: DocId) -> Option<&SparseVector> { self.vectors.get(doc_id as usize) }
}

// Zero vectors stay zero.
fn normalize(mut v: SparseVector) -> SparseVector {
    let norm = v.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in v.iter_mut() {
            *w /= norm;
        }
    }
    v
}
