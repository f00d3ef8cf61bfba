use crate::alert::Alert;
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::index::RelevanceIndex;
use crate::Record;
use serde::Serialize;

/// Best-matching record for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "Similarity Score")]
    pub score: f64,
    #[serde(rename = "Alert", skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

/// Return the record whose headline is most similar to `keyword`.
///
/// Ties go to the lowest corpus position. A keyword with no known terms still
/// yields the first record with score 0; only an empty index is an error.
pub fn best_match(corpus: &Corpus, index: &RelevanceIndex, keyword: &str) -> Result<MatchResult> {
    if index.is_empty() || corpus.is_empty() {
        return Err(Error::NoData);
    }
    if index.num_docs() != corpus.len() {
        return Err(Error::Build(format!(
            "index has {} documents, corpus has {}",
            index.num_docs(),
            corpus.len()
        )));
    }

    let query = index.vectorize(keyword);
    let scores = index.scores(&query);

    let mut best = 0usize;
    for (doc, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = doc;
        }
    }

    let record = corpus.get(best).cloned().ok_or(Error::NoData)?;
    Ok(MatchResult { record, score: scores[best].clamp(0.0, 1.0), alert: None })
}
