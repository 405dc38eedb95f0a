//! Command-line interface and validated runtime settings.
//!
//! Every option can also be supplied through an environment variable.
//! [`Cli::settings`] checks the values once at startup; a bad value is fatal
//! there rather than surfacing halfway through a batch.

use crate::batch::DEFAULT_CONCURRENCY;
use crate::error::NewsError;
use crate::scrapers::fetcher::DEFAULT_USER_AGENT;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Listing host used when none is given.
pub const DEFAULT_HOST: &str = "https://www.investing.com/news/latest-news";

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Walk every listing page until pagination ends
/// news_pager -o ./news
///
/// # Pages 3 to 5, eight workers, keep the link list
/// news_pager -p 3 -n 3 -c 8 --save-links links
///
/// # Re-run a saved link list
/// news_pager --links-file ./news/links.bin
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing host; page `n` is fetched from `{host}/page/{n}`
    #[arg(long, env = "NEWS_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// User-Agent header sent with every request
    #[arg(long, env = "NEWS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// First listing page to read
    #[arg(short = 'p', long, env = "NEWS_START_PAGE", default_value_t = 1, allow_negative_numbers = true)]
    pub start_page: i64,

    /// Number of listing pages to read; reads until pagination ends when omitted
    #[arg(short = 'n', long, env = "NEWS_PAGES")]
    pub pages: Option<u32>,

    /// Number of articles fetched concurrently
    #[arg(short, long, env = "NEWS_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Base directory for article records and link lists
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "./news")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "NEWS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Also save the collected links as `{name}.json` and `{name}.bin`
    #[arg(long, value_name = "NAME")]
    pub save_links: Option<String>,

    /// Extract links from a saved list instead of reading listing pages
    #[arg(long, value_name = "PATH")]
    pub links_file: Option<PathBuf>,
}

/// Validated settings derived from [`Cli`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: Url,
    pub user_agent: String,
    pub start_page: i64,
    pub pages: Option<u32>,
    pub concurrency: usize,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub save_links: Option<String>,
    pub links_file: Option<PathBuf>,
}

impl Cli {
    /// Validate the parsed arguments.
    ///
    /// # Returns
    ///
    /// [`Settings`] ready for the run, or [`NewsError::Config`] naming the
    /// first invalid value.
    pub fn settings(&self) -> Result<Settings, NewsError> {
        let host = Url::parse(&self.host)
            .map_err(|e| NewsError::Config(format!("invalid host {:?}: {e}", self.host)))?;
        if !matches!(host.scheme(), "http" | "https") {
            return Err(NewsError::Config(format!(
                "host must be http or https, got {:?}",
                host.scheme()
            )));
        }
        if self.start_page < 1 || self.start_page > i64::from(u32::MAX) {
            return Err(NewsError::Config(format!(
                "start page must be between 1 and {}, got {}",
                u32::MAX,
                self.start_page
            )));
        }
        if self.concurrency == 0 {
            return Err(NewsError::Config("concurrency must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(NewsError::Config("timeout must be at least 1 second".to_string()));
        }
        if let Some(name) = &self.save_links {
            if name.trim().is_empty() {
                return Err(NewsError::Config("--save-links name is empty".to_string()));
            }
        }

        Ok(Settings {
            host,
            user_agent: self.user_agent.clone(),
            start_page: self.start_page,
            pages: self.pages,
            concurrency: self.concurrency,
            output_dir: self.output_dir.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            save_links: self.save_links.clone(),
            links_file: self.links_file.clone(),
        })
    }
}

impl Settings {
    /// Listing pages to read when `--pages` is given.
    pub fn page_range(&self) -> Option<std::ops::Range<i64>> {
        let count = self.pages?;
        let end = self.start_page.checked_add(i64::from(count))?;
        Some(self.start_page..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["news_pager"]);
        assert_eq!(cli.start_page, 1);
        assert_eq!(cli.concurrency, 14);
        assert_eq!(cli.pages, None);

        let settings = cli.settings().unwrap();
        assert_eq!(settings.host.as_str(), DEFAULT_HOST);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.output_dir, PathBuf::from("./news"));
    }

    #[test]
    fn test_largest_start_page_is_accepted() {
        let cli = Cli::parse_from(["news_pager", "-p", "4294967295", "-n", "4294967295"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.start_page, i64::from(u32::MAX));
        assert_eq!(settings.page_range().unwrap().end, 2 * i64::from(u32::MAX));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_pager", "-p", "3", "-n", "2", "-c", "4", "-o", "/tmp/news",
        ]);
        assert_eq!(cli.start_page, 3);
        assert_eq!(cli.pages, Some(2));
        assert_eq!(cli.concurrency, 4);
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/news"));
    }

    #[test]
    fn test_invalid_settings_are_config_errors() {
        let bad = [
            vec!["news_pager", "--host", "not a url"],
            vec!["news_pager", "--host", "ftp://example.com"],
            vec!["news_pager", "-p", "0"],
            vec!["news_pager", "-p", "-2"],
            vec!["news_pager", "-p", "4294967296"],
            vec!["news_pager", "-p", "9223372036854775807", "-n", "2"],
            vec!["news_pager", "-c", "0"],
            vec!["news_pager", "--timeout-secs", "0"],
            vec!["news_pager", "--save-links", " "],
        ];
        for args in bad {
            let cli = Cli::parse_from(&args);
            assert!(
                matches!(cli.settings(), Err(NewsError::Config(_))),
                "{args:?} should be rejected"
            );
        }
    }
}
