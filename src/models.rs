//! Data models passed between the pipeline stages.
//!
//! - [`PageNumber`]: a validated listing page number
//! - [`ArticleRecord`]: the normalized fields extracted from one article page
//! - [`BatchResult`]: the outcome of processing one link inside a batch
//! - [`BatchSummary`]: aggregate counts over a whole batch
//!
//! `ArticleRecord` serializes with the short keys used by the on-disk format
//! (`head`, `date`, `img_src`, `text`).

use crate::error::NewsError;
use crate::outputs::Persistable;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A listing page number, always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first listing page. Sites usually serve it without a `/1` suffix.
    pub const FIRST: PageNumber = PageNumber(1);

    /// Validate a caller-supplied page number.
    ///
    /// # Errors
    ///
    /// [`NewsError::InvalidPage`] when `page < 1` or the value does not fit
    /// a `u32`.
    pub fn new(page: i64) -> Result<Self, NewsError> {
        match u32::try_from(page) {
            Ok(n) if n >= 1 => Ok(PageNumber(n)),
            _ => Err(NewsError::InvalidPage(page)),
        }
    }

    /// The page number as an unsigned integer.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Page 1 is served at the listing root, so it is never redirect-checked.
    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully extracted article.
///
/// Extraction either yields every field or fails, so a value of this type is
/// always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article headline.
    #[serde(rename = "head")]
    pub headline: String,
    /// Publication time as Unix seconds, UTC.
    #[serde(rename = "date")]
    pub published_at: i64,
    /// Source attribute of the lead image.
    #[serde(rename = "img_src")]
    pub image_url: String,
    /// Paragraphs joined by `\n`, trimmed.
    #[serde(rename = "text")]
    pub body: String,
}

impl ArticleRecord {
    /// Storage key derived from the publication time: `YYYY/MM/DD/HH_MM`.
    ///
    /// Two articles published in the same UTC minute share a key; the
    /// writer disambiguates on collision (see [`crate::outputs`]).
    pub fn storage_key(&self) -> Result<String, NewsError> {
        let published = DateTime::from_timestamp(self.published_at, 0)
            .ok_or(NewsError::Timestamp(self.published_at))?;
        Ok(published.format("%Y/%m/%d/%H_%M").to_string())
    }
}

impl Persistable for ArticleRecord {
    fn replace_existing(&self) -> bool {
        false
    }
}

/// What happened to a single link in a batch.
#[derive(Debug)]
pub enum LinkOutcome {
    /// Extracted and written.
    Saved { key: String, path: PathBuf },
    /// Extracted, but the write failed. The record itself was valid.
    Unsaved { headline: String, error: NewsError },
    /// Fetching or extraction failed.
    Failed(NewsError),
    /// Never started because the batch was shut down first.
    Skipped,
}

/// Per-link result of a batch run.
#[derive(Debug)]
pub struct BatchResult {
    /// Position of the link in the submitted worklist.
    pub index: usize,
    pub url: String,
    pub outcome: LinkOutcome,
}

impl BatchResult {
    /// Whether the record was extracted and written to disk.
    pub fn is_saved(&self) -> bool {
        matches!(self.outcome, LinkOutcome::Saved { .. })
    }

    /// The extraction or save error, if any.
    pub fn error(&self) -> Option<&NewsError> {
        match &self.outcome {
            LinkOutcome::Unsaved { error, .. } | LinkOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Aggregate counts over a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub saved: usize,
    pub unsaved: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    /// Count each outcome kind in `results`.
    pub fn from_results(results: &[BatchResult]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.outcome {
                LinkOutcome::Saved { .. } => summary.saved += 1,
                LinkOutcome::Unsaved { .. } => summary.unsaved += 1,
                LinkOutcome::Failed(_) => summary.failed += 1,
                LinkOutcome::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Share of attempted links whose extraction failed. Skipped links are
    /// not attempts.
    pub fn failure_ratio(&self) -> f64 {
        let attempted = self.total - self.skipped;
        if attempted == 0 {
            0.0
        } else {
            self.failed as f64 / attempted as f64
        }
    }
}
