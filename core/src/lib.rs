use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

pub mod alert;
pub mod corpus;
pub mod error;
pub mod index;
pub mod matcher;
pub mod published;
pub mod refresh;
pub mod tokenizer;

pub use alert::{annotate, Alert};
pub use corpus::{Corpus, LoadReport};
pub use error::{Error, Result, SourceError};
pub use index::RelevanceIndex;
pub use matcher::{best_match, MatchResult};
pub use published::{PublishedState, Snapshot};
pub use refresh::{Ingest, RefreshConfig, RefreshCoordinator, RefreshMonitor, RefreshPhase, RefreshStatus};

pub type TermId = u32;
pub type DocId = u32;

/// One corpus entry. Only constructible through [`Record::new`], which
/// enforces a non-empty headline; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "Headline")]
    headline: String,
    #[serde(rename = "Link")]
    link: String,
    #[serde(rename = "Date")]
    date: String,
}

impl Record {
    /// Returns `None` when the headline is empty after NFKC normalization and trimming.
    pub fn new(headline: &str, link: impl Into<String>, date: impl Into<String>) -> Option<Self> {
        let headline = headline.nfkc().collect::<String>().trim().to_string();
        if headline.is_empty() {
            return None;
        }
        Some(Self { headline, link: link.into(), date: date.into() })
    }

    pub fn headline(&self) -> &str { &self.headline }
    pub fn link(&self) -> &str { &self.link }
    pub fn date(&self) -> &str { &self.date }
}

/// A (headline, link, date) triple as handed over by an ingestion source,
/// before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Headline")]
    pub headline: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
}

impl RawRecord {
    pub fn new(headline: impl Into<String>, link: impl Into<String>, date: Option<String>) -> Self {
        Self { headline: headline.into(), link: link.into(), date }
    }

    pub fn into_record(self) -> Option<Record> {
        Record::new(&self.headline, self.link, self.date.unwrap_or_default())
    }
}

/// A single non-zero entry of a document's term postings list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // normalized tf-idf weight
}
