//! Catalog scraper for a single e-commerce site
//!
//! Two modes:
//! - catalog: paginate every seed category and collect listing rows, one
//!   sheet per category
//! - start: harvest product links from one category and extract each
//!   product's detail page into a single sheet
//!
//! Both v1 (card rows) and v2 (short-list blocks) listing layouts are
//! supported, tried in that order.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod extractors;
pub mod fetcher;
pub mod pagination;
pub mod progress;
pub mod sheet;
pub mod stats;
pub mod text;
pub mod urls;

pub use aggregator::{Aggregator, CatalogReport, CategoryResultSet, DetailReport};
pub use config::ScraperConfig;
pub use error::{ExportError, FetchFailure, Result, ScrapeError};
pub use export::{Table, TabularWriter, XlsxWriter};
pub use fetcher::{Document, HttpFetcher, PageFetcher};
pub use stats::RunStatistics;
