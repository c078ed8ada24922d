//! Error types shared across the crate

use thiserror::Error;

use crate::stats::RunStatistics;

/// A page could not be turned into a document.
///
/// Ends pagination for one category only; never fatal to a run.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Spreadsheet writer errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sheet {sheet} has more columns than a worksheet allows")]
    TooManyColumns { sheet: String },
}

/// Errors surfaced to the operator
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Batch validation is all-or-nothing: every offending seed is listed.
    #[error("invalid URLs: {}", display_list(.0))]
    InvalidUrl(Vec<String>),

    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// Nothing was collected, so there is no useful spreadsheet to write.
    #[error("no products collected ({})", .stats.summary())]
    EmptyResult { stats: RunStatistics },

    #[error("no product links found at {0}")]
    NoProductLinks(String),

    #[error("invalid selector {0:?}")]
    Selector(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("config error: {0}")]
    Config(String),
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "seed list is empty".to_string()
    } else {
        items.join(", ")
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
