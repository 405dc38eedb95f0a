//! # News Pager
//!
//! Reads paginated news listing pages, follows every article teaser to its
//! article page, and stores each article as a JSON record keyed by its
//! publication time.
//!
//! ## Usage
//!
//! ```sh
//! news_pager -o ./news -c 14
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: listing pages are read in order until one lists no articles
//! 2. **Extraction**: article pages are fetched and parsed concurrently
//! 3. **Output**: each record is written to `{output_dir}/YYYY/MM/DD/HH_MM.json`
//!
//! A failing article is reported and counted; it never stops the batch.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_pager::batch::BatchRunner;
use news_pager::cli::Cli;
use news_pager::links::LinkSet;
use news_pager::models::{BatchSummary, LinkOutcome};
use news_pager::outputs::Persistable;
use news_pager::scrapers::article::ArticleExtractor;
use news_pager::scrapers::fetcher::PageFetcher;
use news_pager::scrapers::listing::LinkCollector;
use news_pager::utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_pager starting up");

    let args = Cli::parse();
    let settings = match args.settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(?settings, "Resolved settings");

    if let Err(e) = ensure_writable_dir(&settings.output_dir).await {
        error!(
            path = %settings.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let fetcher = PageFetcher::new(&settings.user_agent, Some(settings.timeout))?;
    let runner = BatchRunner::new(
        LinkCollector::new(fetcher.clone(), settings.host.clone()),
        ArticleExtractor::new(fetcher),
        settings.output_dir.clone(),
    );

    let shutdown = runner.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing in-flight articles and skipping the rest");
            shutdown.shutdown();
        }
    });

    // ---- Collect links ----
    let links = if let Some(path) = &settings.links_file {
        LinkSet::load(path).await?
    } else if let Some(range) = settings.page_range() {
        let pages: Vec<i64> = range.collect();
        runner.collect_pages(&pages).await
    } else {
        runner.discover(settings.start_page, None).await
    };
    info!(count = links.len(), "Links to extract");

    if let Some(name) = &settings.save_links {
        for saved in [
            links.save_to_json(&settings.output_dir, name).await,
            links.save_to_file(&settings.output_dir, name).await,
        ] {
            match saved {
                Ok(path) => info!(path = %path.display(), "Saved link list"),
                Err(e) => error!(error = %e, "Failed to save link list"),
            }
        }
    }

    // ---- Extract articles ----
    let mut results = runner
        .run_links(links, Some(settings.concurrency))
        .await;
    results.sort_by_key(|r| r.index);

    for result in &results {
        match &result.outcome {
            LinkOutcome::Saved { key, path } => {
                info!(index = result.index, url = %result.url, %key, path = %path.display(), "saved")
            }
            LinkOutcome::Unsaved { headline, error } => {
                error!(index = result.index, url = %result.url, %headline, %error, "extracted, not saved")
            }
            LinkOutcome::Failed(error) => {
                warn!(index = result.index, url = %result.url, kind = error.kind(), %error, "failed")
            }
            LinkOutcome::Skipped => info!(index = result.index, url = %result.url, "skipped"),
        }
    }

    let summary = BatchSummary::from_results(&results);
    let elapsed = start_time.elapsed();
    info!(
        total = summary.total,
        saved = summary.saved,
        unsaved = summary.unsaved,
        failed = summary.failed,
        skipped = summary.skipped,
        failure_ratio = summary.failure_ratio(),
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
