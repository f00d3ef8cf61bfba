use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("corpus source unreadable: {0}")]
    Source(#[from] SourceError),

    #[error("corpus is missing required fields: {}", missing.join(", "))]
    Schema { missing: Vec<&'static str> },

    #[error("index invariant violated: {0}")]
    Build(String),

    #[error("No data available. Try again later.")]
    NoData,

    #[error("Keyword is required")]
    MissingKeyword,

    #[error("ingestion failed: {0:#}")]
    Ingest(anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON corpus must be an array of objects or a single object")]
    NotTabular,

    #[error("unsupported corpus format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl Error {
    /// Query-time errors that the request layer should report back to the caller
    /// instead of treating as an internal failure.
    pub fn is_client_visible(&self) -> bool {
        matches!(self, Error::NoData | Error::MissingKeyword)
    }
}
