//! Concurrent batch extraction.
//!
//! Listing pages are walked one after another, since whether page `n + 1`
//! exists is only known once page `n` has been parsed. The collected links are
//! then extracted concurrently, at most `concurrency` at a time, and every
//! successful record is written under the output directory.
//!
//! Each link produces exactly one [`BatchResult`]. A failure is recorded on
//! its own result and never stops the other links. Results arrive in
//! completion order; [`BatchResult::index`] holds the submission position.

use crate::links::LinkSet;
use crate::models::{BatchResult, LinkOutcome};
use crate::outputs::{self, Persistable};
use crate::scrapers::article::ArticleExtractor;
use crate::scrapers::listing::LinkCollector;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, instrument, warn};

/// Worker pool width used when the caller does not pick one.
pub const DEFAULT_CONCURRENCY: usize = 14;

/// Best-effort stop signal for a running batch.
///
/// Once triggered, links that have not started yet are reported as
/// [`LinkOutcome::Skipped`]; requests already in flight run to completion.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Request shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives a whole run: listing collection, concurrent extraction and
/// persistence of each record under `output_dir`.
#[derive(Debug)]
pub struct BatchRunner {
    collector: LinkCollector,
    extractor: ArticleExtractor,
    output_dir: PathBuf,
    shutdown: ShutdownHandle,
}

impl BatchRunner {
    /// Create a runner.
    ///
    /// # Arguments
    ///
    /// * `collector` - reads listing pages into links
    /// * `extractor` - turns each link into an [`ArticleRecord`](crate::models::ArticleRecord)
    /// * `output_dir` - base directory for `YYYY/MM/DD/HH_MM.json` records
    pub fn new(collector: LinkCollector, extractor: ArticleExtractor, output_dir: PathBuf) -> Self {
        Self {
            collector,
            extractor,
            output_dir,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Handle that stops this runner from starting further work.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Collect links from each of `pages` in order. A page that fails to
    /// fetch contributes no links.
    #[instrument(level = "info", skip(self))]
    pub async fn collect_pages(&self, pages: &[i64]) -> LinkSet {
        let mut links = LinkSet::new();
        for &page in pages {
            if self.shutdown.is_shutdown() {
                warn!(page, "Shutdown requested; stopping listing collection");
                break;
            }
            links.extend(self.collector.collect(page).await);
        }
        info!(pages = pages.len(), count = links.len(), "Collected listing links");
        links
    }

    /// Walk listing pages from `start` until one lists no articles, a page
    /// fails to fetch, `max_pages` pages have been read, or shutdown.
    #[instrument(level = "info", skip(self))]
    pub async fn discover(&self, start: i64, max_pages: Option<u32>) -> LinkSet {
        let mut links = LinkSet::new();
        let mut page = start;
        let mut visited = 0u32;

        while max_pages.is_none_or(|max| visited < max) {
            if self.shutdown.is_shutdown() {
                warn!(page, "Shutdown requested; stopping discovery");
                break;
            }
            match self.collector.try_collect(page).await {
                Ok(found) if found.is_empty() => {
                    info!(page, "Listing page has no articles; end of pagination");
                    break;
                }
                Ok(found) => links.extend(found),
                Err(e) => {
                    warn!(page, error = %e, kind = e.kind(), "Listing fetch failed; stopping discovery");
                    break;
                }
            }
            visited += 1;
            page += 1;
        }

        info!(start, pages = visited, count = links.len(), "Discovery finished");
        links
    }

    /// Collect links from `pages`, then extract them all.
    pub async fn run(&self, pages: &[i64], concurrency: Option<usize>) -> Vec<BatchResult> {
        let links = self.collect_pages(pages).await;
        self.run_links(links, concurrency).await
    }

    /// Extract and persist every link, `concurrency` at a time
    /// (default [`DEFAULT_CONCURRENCY`]).
    ///
    /// # Returns
    ///
    /// One [`BatchResult`] per link in completion order. A saved result
    /// carries the key actually written, which gains a `_N` suffix when
    /// another article already holds the same minute.
    #[instrument(level = "info", skip_all, fields(links = links.len()))]
    pub async fn run_links(&self, links: LinkSet, concurrency: Option<usize>) -> Vec<BatchResult> {
        let workers = concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);
        let total = links.len();
        info!(workers, total, "Starting batch");

        let results: Vec<BatchResult> = stream::iter(links.into_iter().enumerate())
            .map(|(index, url)| self.process(index, url))
            .buffer_unordered(workers)
            .collect()
            .await;

        debug_assert_eq!(results.len(), total);
        info!(total, "Batch finished");
        results
    }

    async fn process(&self, index: usize, url: String) -> BatchResult {
        if self.shutdown.is_shutdown() {
            debug!(index, %url, "Shutdown requested; skipping link");
            return BatchResult {
                index,
                url,
                outcome: LinkOutcome::Skipped,
            };
        }

        let outcome = match self.extractor.extract(&url).await {
            Ok(record) => {
                // A same-minute collision writes to a suffixed file; report that key.
                let saved = match record.storage_key() {
                    Ok(key) => record
                        .save_to_json(&self.output_dir, &key)
                        .await
                        .map(|path| {
                            let stored = outputs::stored_key(&self.output_dir, &path).unwrap_or(key);
                            (stored, path)
                        }),
                    Err(e) => Err(e),
                };
                match saved {
                    Ok((key, path)) => LinkOutcome::Saved { key, path },
                    Err(e) => {
                        error!(index, %url, error = %e, "Extracted article could not be saved");
                        LinkOutcome::Unsaved {
                            headline: record.headline,
                            error: e,
                        }
                    }
                }
            }
            Err(e) => {
                warn!(index, %url, error = %e, kind = e.kind(), "Article extraction failed");
                LinkOutcome::Failed(e)
            }
        };

        BatchResult {
            index,
            url,
            outcome,
        }
    }
}
