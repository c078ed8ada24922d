//! Category aggregation and the start-mode product trail
//!
//! [`Aggregator`] owns one run: it drives the pagination walker over every
//! category, folds the pages of each category into a [`CategoryResultSet`],
//! names its sheet and keeps the run statistics. Everything is sequential;
//! a category is finished before the next one starts.

use std::thread;

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::extractors::{LinkSet, ProductDetailRecord, ProductSummaryRow, SiteExtractors};
use crate::fetcher::PageFetcher;
use crate::pagination::CategoryPages;
use crate::progress::Progress;
use crate::sheet::SheetNamer;
use crate::stats::{RunStatistics, StatsBuilder};
use crate::urls::{UrlNormalizer, normalize_seeds, validate_seeds};

/// All rows collected for one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResultSet {
    pub sheet_name: String,
    /// Heading of the first page, or the source URL when it had none
    pub title: String,
    pub source_url: String,
    pub rows: Vec<ProductSummaryRow>,
    pub pages: u32,
}

/// Outcome of a catalog run. Only successful categories are listed.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogReport {
    pub categories: Vec<CategoryResultSet>,
    pub stats: RunStatistics,
}

impl CatalogReport {
    /// Every row of the run in category order, then page order.
    pub fn rows(&self) -> impl Iterator<Item = &ProductSummaryRow> {
        self.categories.iter().flat_map(|c| c.rows.iter())
    }
}

/// Outcome of a start-mode run.
#[derive(Debug, Clone, Serialize)]
pub struct DetailReport {
    pub seed: String,
    /// Harvested product links, deduplicated across pages
    pub links: Vec<String>,
    pub records: Vec<ProductDetailRecord>,
    pub stats: RunStatistics,
}

pub struct Aggregator<F: PageFetcher, P: Progress> {
    config: ScraperConfig,
    fetcher: F,
    extractors: SiteExtractors,
    normalizer: UrlNormalizer,
    progress: P,
}

impl<F: PageFetcher, P: Progress> Aggregator<F, P> {
    pub fn new(config: ScraperConfig, fetcher: F, progress: P) -> Result<Self> {
        let extractors = SiteExtractors::new(&config)?;
        let normalizer = UrlNormalizer::new(config.page_size);
        Ok(Self {
            config,
            fetcher,
            extractors,
            normalizer,
            progress,
        })
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Crawl every category in `raw_seeds`.
    ///
    /// The seed list is validated as a whole before anything is fetched. A
    /// category whose first page cannot be fetched is counted as failed and
    /// the run moves on; a run that collects no rows at all is an error.
    pub fn run_catalog<S: AsRef<str>>(&mut self, raw_seeds: &[S]) -> Result<CatalogReport> {
        let seeds = normalize_seeds(raw_seeds);
        let urls = validate_seeds(&seeds)?;
        info!(categories = urls.len(), "starting catalog run");
        self.progress.begin(urls.len());

        let mut namer = SheetNamer::new();
        let mut stats = StatsBuilder::default();
        let mut categories = Vec::new();

        for (seed, url) in seeds.iter().zip(urls) {
            match self.crawl_category(seed, url, &mut namer) {
                Some(category) => {
                    stats.succeeded(category.rows.len());
                    categories.push(category);
                }
                None => stats.failed(seed.as_str()),
            }
        }

        let stats = stats.finish();
        info!(
            total = stats.total,
            success = stats.success,
            failed = stats.failed,
            products = stats.total_products,
            "catalog run finished"
        );
        if stats.total_products == 0 {
            return Err(ScrapeError::EmptyResult { stats });
        }
        Ok(CatalogReport { categories, stats })
    }

    /// Walk one category to the end. `None` when not a single page loaded.
    fn crawl_category(
        &mut self,
        seed: &str,
        url: Url,
        namer: &mut SheetNamer,
    ) -> Option<CategoryResultSet> {
        let Self {
            fetcher,
            extractors,
            normalizer,
            progress,
            ..
        } = self;

        let mut pages = CategoryPages::new(&*fetcher, extractors, *normalizer, url);
        let mut result: Option<CategoryResultSet> = None;

        for page in pages.by_ref() {
            let (layout, rows) = extractors.listing_rows(&page.document);
            let category = result.get_or_insert_with(|| {
                let title = extractors
                    .category_title(&page.document)
                    .unwrap_or_else(|| seed.to_string());
                CategoryResultSet {
                    sheet_name: namer.make_unique(&title),
                    title,
                    source_url: seed.to_string(),
                    rows: Vec::new(),
                    pages: 0,
                }
            });

            if rows.is_empty() {
                warn!(url = %page.url, "no products on page");
            }
            progress.page_done(&category.title, page.index, layout, rows.len());
            category.rows.extend(rows);
            category.pages += 1;
        }

        match &result {
            Some(category) => {
                if let Some(e) = pages.failure() {
                    warn!(
                        url = seed,
                        pages = category.pages,
                        error = %e,
                        "category ended early, keeping collected rows"
                    );
                }
                progress.category_done(&category.title, category.pages, category.rows.len());
            }
            None => {
                warn!(url = seed, "category failed, no page could be loaded");
                progress.category_done(seed, 0, 0);
            }
        }
        result
    }

    /// Harvest product links from one category, then extract every linked
    /// detail page. Failed detail pages are logged and skipped.
    pub fn run_start(&mut self, raw_seed: &str) -> Result<DetailReport> {
        let seeds = normalize_seeds([raw_seed]);
        let url = validate_seeds(&seeds)?
            .into_iter()
            .next()
            .ok_or_else(|| ScrapeError::InvalidUrl(vec![raw_seed.to_string()]))?;
        let seed = url.to_string();

        let links = self.harvest_links(url)?;
        if links.is_empty() {
            return Err(ScrapeError::NoProductLinks(seed));
        }
        info!(links = links.len(), "collected product links");
        self.progress.begin(links.len());

        let delay = self.config.detail_delay();
        let mut stats = StatsBuilder::default();
        let mut records = Vec::with_capacity(links.len());

        for (i, link) in links.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            let fetched = Url::parse(link)
                .map_err(|e| e.to_string())
                .and_then(|url| self.fetcher.fetch(&url).map_err(|e| e.to_string()));
            match fetched {
                Ok(doc) => {
                    records.push(self.extractors.product_detail(&doc));
                    stats.succeeded(1);
                    self.progress.detail_done(i + 1, links.len(), true);
                }
                Err(reason) => {
                    warn!(url = %link, error = %reason, "skipping product");
                    stats.failed(link.as_str());
                    self.progress.detail_done(i + 1, links.len(), false);
                }
            }
        }

        let stats = stats.finish();
        info!(
            total = stats.total,
            success = stats.success,
            failed = stats.failed,
            "start run finished"
        );
        if records.is_empty() {
            return Err(ScrapeError::EmptyResult { stats });
        }
        Ok(DetailReport {
            seed,
            links,
            records,
            stats,
        })
    }

    /// Product links across every page of the category, first-seen order.
    /// Fails only when the very first page cannot be fetched.
    fn harvest_links(&mut self, url: Url) -> Result<Vec<String>> {
        let mut pages = CategoryPages::new(&self.fetcher, &self.extractors, self.normalizer, url);
        let mut links = LinkSet::default();

        for page in pages.by_ref() {
            let found = self.extractors.product_links(&page.document);
            let before = links.len();
            let count = found.len();
            links.extend(found);
            info!(
                page = page.index,
                found = count,
                new = links.len() - before,
                "harvested links"
            );
        }

        if pages.yielded() == 0 {
            if let Some(failure) = pages.into_failure() {
                return Err(failure.into());
            }
        }
        Ok(links.into_vec())
    }
}
