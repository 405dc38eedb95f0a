//! Single-request page fetcher shared by listing and article scraping.
//!
//! Every request carries the configured user agent. Listing fetches pass the
//! page number they expect so the fetcher can reject page numbers below 1
//! before any request is sent, and can detect the host redirecting an
//! out-of-range page somewhere else.

use crate::error::NewsError;
use crate::models::PageNumber;
use reqwest::{Client, StatusCode};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Desktop browser user agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP GET + status validation + HTML parsing.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher with the given user agent and optional per-request
    /// timeout.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, NewsError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch `url` and parse the body into a document tree.
    ///
    /// When `expected_page` is given it is validated before the request and
    /// compared to the resolved address afterwards. Page 1 is exempt from the
    /// address check because sites commonly serve it without a page suffix.
    ///
    /// # Errors
    ///
    /// - [`NewsError::InvalidPage`] for `expected_page < 1` (no request sent)
    /// - [`NewsError::PageOutOfRange`] when the host resolved another page
    /// - [`NewsError::Upstream`] for any status other than `200`
    /// - [`NewsError::Transport`] for connection, timeout, or body failures
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str, expected_page: Option<i64>) -> Result<Html, NewsError> {
        let expected = expected_page.map(PageNumber::new).transpose()?;

        let response = self.client.get(url).send().await?;
        let resolved = response.url().clone();

        if let Some(page) = expected {
            if !resolves_to_page(&resolved, page) {
                warn!(%resolved, page = page.get(), "Host resolved a different page");
                return Err(NewsError::PageOutOfRange {
                    requested: page.get(),
                    resolved: resolved.to_string(),
                });
            }
        }

        let status = response.status();
        if status != StatusCode::OK {
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                url: resolved.to_string(),
            });
        }

        let body = response.text().await?;
        info!(bytes = body.len(), %resolved, "Fetched page");
        Ok(Html::parse_document(&body))
    }
}

/// True when the last non-empty path segment of `resolved` is the page
/// numeral. The first page always passes.
fn resolves_to_page(resolved: &Url, page: PageNumber) -> bool {
    if page.is_first() {
        return true;
    }
    let last = resolved
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());
    debug!(?last, page = page.get(), "Checking resolved page segment");
    last == Some(page.to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> PageFetcher {
        PageFetcher::new("news-pager-test/1.0", Some(Duration::from_secs(5))).unwrap()
    }

    fn page(n: u32) -> PageNumber {
        PageNumber::new(i64::from(n)).unwrap()
    }

    #[test]
    fn test_resolves_to_page_segment_match() {
        let url = Url::parse("https://example.com/news/page/12").unwrap();
        assert!(resolves_to_page(&url, page(12)));
        assert!(!resolves_to_page(&url, page(2)));

        let trailing = Url::parse("https://example.com/news/page/3/").unwrap();
        assert!(resolves_to_page(&trailing, page(3)));

        let root = Url::parse("https://example.com/news").unwrap();
        assert!(resolves_to_page(&root, page(1)));
        assert!(!resolves_to_page(&root, page(4)));
    }

    #[tokio::test]
    async fn test_invalid_page_sends_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        for bad in [0, -1, -42] {
            let url = format!("{}/page/{}", server.uri(), bad);
            let err = fetcher().fetch(&url, Some(bad)).await.unwrap_err();
            assert!(matches!(err, NewsError::InvalidPage(p) if p == bad));
        }
    }

    #[tokio::test]
    async fn test_redirected_page_is_out_of_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page/99"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/page/1", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let url = format!("{}/page/99", server.uri());
        let err = fetcher().fetch(&url, Some(99)).await.unwrap_err();
        match err {
            NewsError::PageOutOfRange { requested, resolved } => {
                assert_eq!(requested, 99);
                assert!(resolved.ends_with("/page/1"));
            }
            other => panic!("expected PageOutOfRange, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_200_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/news/gone", server.uri());
        let err = fetcher().fetch(&url, None).await.unwrap_err();
        assert!(matches!(err, NewsError::Upstream { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_sends_user_agent_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page/2"))
            .and(header("user-agent", "news-pager-test/1.0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body><h1>Two</h1></body></html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/page/2", server.uri());
        let document = fetcher().fetch(&url, Some(2)).await.unwrap();
        let h1 = Selector::parse("h1").unwrap();
        let text: String = document.select(&h1).next().unwrap().text().collect();
        assert_eq!(text, "Two");
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Port 9 (discard) on localhost is not served by the mock server.
        let err = fetcher()
            .fetch("http://127.0.0.1:9/page/1", Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, NewsError::Transport(_)));
    }
}
