//! Run-level counters reported back to the operator

use serde::Serialize;

/// Outcome counts for one run.
///
/// In catalog mode a unit is a category URL; in start mode it is a product
/// detail link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub failed_links: Vec<String>,
    pub total_products: usize,
}

impl RunStatistics {
    pub fn summary(&self) -> String {
        format!(
            "total: {} | success: {} | failed: {} | products: {}",
            self.total, self.success, self.failed, self.total_products
        )
    }
}

/// Builds [`RunStatistics`] incrementally; `finish` freezes it.
#[derive(Debug, Default)]
pub(crate) struct StatsBuilder {
    total: usize,
    success: usize,
    failed_links: Vec<String>,
    total_products: usize,
}

impl StatsBuilder {
    pub(crate) fn succeeded(&mut self, products: usize) {
        self.total += 1;
        self.success += 1;
        self.total_products += products;
    }

    pub(crate) fn failed(&mut self, link: impl Into<String>) {
        self.total += 1;
        self.failed_links.push(link.into());
    }

    pub(crate) fn finish(self) -> RunStatistics {
        RunStatistics {
            total: self.total,
            success: self.success,
            failed: self.total - self.success,
            failed_links: self.failed_links,
            total_products: self.total_products,
        }
    }
}
