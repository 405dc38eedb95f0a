//! Error taxonomy shared by every stage of the pipeline.
//!
//! Fetching, parsing, link-list access and persistence all report failures
//! through [`NewsError`]. The batch runner keeps each error attached to the
//! link that produced it, so none of these variants ever abort a batch.

use std::path::PathBuf;
use thiserror::Error;

/// Failures produced while fetching, extracting or storing news data.
#[derive(Error, Debug)]
pub enum NewsError {
    /// A listing page number below 1 was requested.
    #[error("invalid page number {0}: pages start at 1")]
    InvalidPage(i64),

    /// The listing host resolved the request to a different page.
    #[error("page {requested} is out of range (resolved to {resolved})")]
    PageOutOfRange { requested: u32, resolved: String },

    /// The upstream answered with something other than `200 OK`.
    #[error("upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },

    /// Connection, timeout, or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An element the article layout requires is missing.
    #[error("malformed article {url}: missing {missing}")]
    MalformedArticle { url: String, missing: &'static str },

    /// The article date text does not match `Mon DD, YYYY HH:MMAM`.
    #[error("unrecognized article date {text:?}")]
    DateParse { text: String },

    /// Link index outside the bounds of the set.
    #[error("index {index} out of range for {len} links")]
    IndexOutOfRange { index: isize, len: usize },

    /// Slice bounds that cannot select anything (zero step).
    #[error("invalid index: {0}")]
    InvalidIndexType(String),

    /// Writing or reading a file failed.
    #[error("failed to persist {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("blob error: {0}")]
    Blob(#[from] bincode::Error),

    /// Timestamp cannot be rendered as a calendar date.
    #[error("timestamp {0} is outside the supported date range")]
    Timestamp(i64),

    /// Invalid startup configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NewsError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NewsError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the failure kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            NewsError::InvalidPage(_) => "invalid_page",
            NewsError::PageOutOfRange { .. } => "page_out_of_range",
            NewsError::Upstream { .. } => "upstream",
            NewsError::Transport(_) => "transport",
            NewsError::MalformedArticle { .. } => "malformed_article",
            NewsError::DateParse { .. } => "date_parse",
            NewsError::IndexOutOfRange { .. } => "index_out_of_range",
            NewsError::InvalidIndexType(_) => "invalid_index_type",
            NewsError::Persistence { .. } => "persistence",
            NewsError::Json(_) => "json",
            NewsError::Blob(_) => "blob",
            NewsError::Timestamp(_) => "timestamp",
            NewsError::Config(_) => "config",
        }
    }
}
