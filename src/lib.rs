//! Paginated news listing scraper.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! - [`scrapers::listing::LinkCollector`] turns a listing page number into a
//!   [`links::LinkSet`] of absolute article URLs
//! - [`scrapers::article::ArticleExtractor`] turns an article URL into a
//!   [`models::ArticleRecord`]
//! - [`batch::BatchRunner`] walks listing pages and extracts every link
//!   through a bounded pool, writing each record with [`outputs::Persistable`]
//!
//! All failures are reported as [`error::NewsError`].

pub mod batch;
pub mod cli;
pub mod error;
pub mod links;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;
