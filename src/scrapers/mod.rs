//! Fetching and parsing of listing and article pages.
//!
//! Scraping happens in two phases:
//!
//! 1. **Listing**: read numbered listing pages and collect article links
//! 2. **Article**: fetch each linked page and extract an [`ArticleRecord`]
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetcher`] | one GET per call, status and page-number checks, HTML parsing |
//! | [`listing`] | listing page → [`LinkSet`] |
//! | [`article`] | article page → [`ArticleRecord`] |
//!
//! Parsing is split from fetching (`parse_listing`, `parse_article`) so page
//! layouts can be tested against fixtures without a network.
//!
//! [`ArticleRecord`]: crate::models::ArticleRecord
//! [`LinkSet`]: crate::links::LinkSet

pub mod article;
pub mod fetcher;
pub mod listing;
