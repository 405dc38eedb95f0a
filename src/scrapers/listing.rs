//! Listing page scraper.
//!
//! Listing pages live at `{host}/page/{n}`. Article teasers sit inside a
//! single `div.largeTitle` container; each teaser is an
//! `article.js-article-item.articleItem` whose `a.title` anchor links to the
//! article. A page without the container has no articles, which is how the
//! site signals the end of pagination.

use crate::error::NewsError;
use crate::links::LinkSet;
use crate::scrapers::fetcher::PageFetcher;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

static CONTAINER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.largeTitle").expect("valid container selector"));
static TEASER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("article.js-article-item.articleItem").expect("valid teaser selector")
});
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.title[href]").expect("valid title selector"));

/// Collects article links from numbered listing pages.
#[derive(Debug, Clone)]
pub struct LinkCollector {
    fetcher: PageFetcher,
    host: Url,
}

impl LinkCollector {
    /// Create a collector for listings served under `host`.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - shared HTTP client used for every listing page
    /// * `host` - listing root; page `n` lives at `{host}/page/{n}` and
    ///   relative teaser links are resolved against it
    pub fn new(fetcher: PageFetcher, host: Url) -> Self {
        Self { fetcher, host }
    }

    /// Address of listing page `page`.
    pub fn listing_url(&self, page: i64) -> String {
        format!("{}/page/{}", self.host.as_str().trim_end_matches('/'), page)
    }

    /// Fetch listing page `page` and collect its article links.
    ///
    /// An empty [`LinkSet`] means the page exists but lists no articles.
    /// Fetch failures are returned as errors so callers can tell the two
    /// apart.
    #[instrument(level = "info", skip(self))]
    pub async fn try_collect(&self, page: i64) -> Result<LinkSet, NewsError> {
        let url = self.listing_url(page);
        let document = self.fetcher.fetch(&url, Some(page)).await?;
        let links = parse_listing(&document, &self.host);
        info!(count = links.len(), page, "Indexed listing page");
        debug!(links = ?links, "Listing links");
        Ok(links)
    }

    /// Like [`try_collect`](Self::try_collect), but a fetch failure is logged
    /// and yields an empty set.
    pub async fn collect(&self, page: i64) -> LinkSet {
        match self.try_collect(page).await {
            Ok(links) => links,
            Err(e) => {
                warn!(page, error = %e, kind = e.kind(), "Listing fetch failed; treating page as empty");
                LinkSet::new()
            }
        }
    }
}

/// Extract absolute article links from a parsed listing page, in page order.
pub fn parse_listing(document: &Html, host: &Url) -> LinkSet {
    let Some(container) = document.select(&CONTAINER).next() else {
        debug!("No teaser container on page");
        return LinkSet::new();
    };

    let mut links = LinkSet::new();
    for teaser in container.select(&TEASER) {
        let Some(href) = teaser
            .select(&TITLE_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            warn!("Teaser without a title link; skipping");
            continue;
        };
        match host.join(href) {
            Ok(resolved) => links.push(resolved.to_string()),
            Err(e) => warn!(%href, error = %e, "Unresolvable teaser link; skipping"),
        }
    }
    links
}
