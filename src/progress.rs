//! Progress reporting for long-running crawls
//!
//! Frontends implement [`Progress`] to surface status between page fetches.
//! Every hook has a no-op default.

use tracing::info;

use crate::extractors::Layout;

pub trait Progress {
    /// Called once per run with the number of units (categories or product links).
    fn begin(&mut self, _total: usize) {}

    /// One listing page was fetched and extracted.
    fn page_done(&mut self, _category: &str, _index: u32, _layout: Option<Layout>, _items: usize) {}

    /// A category's pagination ended. `pages == 0` means it failed outright.
    fn category_done(&mut self, _category: &str, _pages: u32, _rows: usize) {}

    /// Detail page `n` of `total` was processed (1-based).
    fn detail_done(&mut self, _n: usize, _total: usize, _ok: bool) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Emits one `tracing` event per hook.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        info!(total, "starting run");
    }

    fn page_done(&mut self, category: &str, index: u32, layout: Option<Layout>, items: usize) {
        info!(category, page = index, ?layout, items, "page processed");
    }

    fn category_done(&mut self, category: &str, pages: u32, rows: usize) {
        info!(category, pages, rows, of = self.total, "category finished");
    }

    fn detail_done(&mut self, n: usize, total: usize, ok: bool) {
        info!("product {n}/{total} {}", if ok { "done" } else { "skipped" });
    }
}
