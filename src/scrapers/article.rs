//! Article page scraper.
//!
//! The article content sits in `section#leftColumn`:
//!
//! | Field | Location |
//! |-------|----------|
//! | headline | `h1.articleHeader` |
//! | date | first `span` of `div.contentSectionDetails`, e.g. `Jan 05, 2021 10:30AM` |
//! | lead image | first `img[src]` of `div.articlePage` |
//! | body | every `p` of `div.articlePage`, joined by newlines |
//!
//! Extraction is all-or-nothing: a missing element fails the whole article
//! instead of producing a partial record.

use crate::error::NewsError;
use crate::models::ArticleRecord;
use crate::scrapers::fetcher::PageFetcher;
use crate::utils::truncate_for_log;
use chrono::NaiveDateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

static CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("section#leftColumn").expect("valid content selector"));
static HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1.articleHeader").expect("valid headline selector"));
static DETAILS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.contentSectionDetails").expect("valid details selector")
});
static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").expect("valid span selector"));
static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.articlePage").expect("valid body selector"));
static IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[src]").expect("valid image selector"));
static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// `Jan 05, 2021 10:30AM`; searched for, so surrounding text is tolerated.
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][a-z]{2} \d{2}, \d{4} \d{2}:\d{2}(?:AM|PM)").expect("valid date pattern")
});
const DATE_FORMAT: &str = "%b %d, %Y %I:%M%p";

/// Fetches article pages and extracts [`ArticleRecord`]s.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    fetcher: PageFetcher,
}

impl ArticleExtractor {
    /// Create an extractor that fetches through `fetcher`.
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch `url` and extract its record.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> Result<ArticleRecord, NewsError> {
        let document = self.fetcher.fetch(url, None).await?;
        let record = parse_article(&document, url)?;
        info!(
            headline = %record.headline,
            published_at = record.published_at,
            bytes = record.body.len(),
            "Parsed article"
        );
        debug!(body = %truncate_for_log(&record.body, 200), "Article body");
        Ok(record)
    }
}

/// Extract a record from a parsed article page. `url` is only used in errors.
pub fn parse_article(document: &Html, url: &str) -> Result<ArticleRecord, NewsError> {
    let missing = |what: &'static str| NewsError::MalformedArticle {
        url: url.to_string(),
        missing: what,
    };

    let content = document
        .select(&CONTENT)
        .next()
        .ok_or_else(|| missing("content section"))?;

    let headline = content
        .select(&HEADLINE)
        .next()
        .map(|h| element_text(&h).trim().to_string())
        .ok_or_else(|| missing("headline"))?;

    let date_text = content
        .select(&DETAILS)
        .next()
        .and_then(|details| details.select(&SPAN).next())
        .map(|span| element_text(&span))
        .ok_or_else(|| missing("date"))?;
    let published_at = parse_published_at(&date_text)?;

    let body = content
        .select(&BODY)
        .next()
        .ok_or_else(|| missing("article body"))?;

    let image_url = body
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
        .ok_or_else(|| missing("lead image"))?;

    let paragraphs: Vec<String> = body.select(&PARAGRAPH).map(|p| element_text(&p)).collect();
    if paragraphs.is_empty() {
        return Err(missing("paragraphs"));
    }
    let body = paragraphs.iter().join("\n").trim().to_string();

    Ok(ArticleRecord {
        headline,
        published_at,
        image_url,
        body,
    })
}

/// Parse the article date text as UTC and return Unix seconds.
pub fn parse_published_at(text: &str) -> Result<i64, NewsError> {
    let failed = || NewsError::DateParse {
        text: text.trim().to_string(),
    };
    let stamp = DATE_PATTERN.find(text).ok_or_else(failed)?;
    let parsed =
        NaiveDateTime::parse_from_str(stamp.as_str(), DATE_FORMAT).map_err(|_| failed())?;
    Ok(parsed.and_utc().timestamp())
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}
