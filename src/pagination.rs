//! Category pagination
//!
//! [`CategoryPages`] walks `/page-1/`, `/page-2/`, ... of one category,
//! yielding each page as soon as it is fetched. The next URL is only
//! computed when the caller asks for the next page, and only if the previous
//! page carried the "show more" marker.

use std::iter::FusedIterator;

use tracing::{info, warn};
use url::Url;

use crate::error::FetchFailure;
use crate::extractors::SiteExtractors;
use crate::fetcher::{Document, PageFetcher};
use crate::urls::{CategoryUrl, UrlNormalizer};

/// One fetched listing page.
#[derive(Debug)]
pub struct Page {
    /// 1-based
    pub index: u32,
    pub url: CategoryUrl,
    pub document: Document,
}

#[derive(Debug)]
enum WalkState {
    Start(Url),
    Fetching { url: CategoryUrl, index: u32 },
    HasPage { url: CategoryUrl, index: u32, more: bool },
    Exhausted,
    Failed,
}

/// Single-pass iterator over the pages of one category.
///
/// There are no retries: the first failed fetch ends the walk, and pages
/// already yielded stay with the caller.
pub struct CategoryPages<'a, F: PageFetcher> {
    fetcher: &'a F,
    extractors: &'a SiteExtractors,
    normalizer: UrlNormalizer,
    state: WalkState,
    yielded: u32,
    failure: Option<FetchFailure>,
}

impl<'a, F: PageFetcher> CategoryPages<'a, F> {
    pub fn new(
        fetcher: &'a F,
        extractors: &'a SiteExtractors,
        normalizer: UrlNormalizer,
        seed: Url,
    ) -> Self {
        Self {
            fetcher,
            extractors,
            normalizer,
            state: WalkState::Start(seed),
            yielded: 0,
            failure: None,
        }
    }

    /// Pages yielded so far
    pub fn yielded(&self) -> u32 {
        self.yielded
    }

    /// The fetch failure that ended the walk, if any.
    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, WalkState::Failed)
    }

    pub fn into_failure(self) -> Option<FetchFailure> {
        self.failure
    }
}

impl<F: PageFetcher> Iterator for CategoryPages<'_, F> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        loop {
            match std::mem::replace(&mut self.state, WalkState::Exhausted) {
                WalkState::Start(seed) => {
                    self.state = WalkState::Fetching {
                        url: self.normalizer.normalize(&seed),
                        index: 1,
                    };
                }
                WalkState::Fetching { url, index } => {
                    info!(page = index, url = %url, "loading page");
                    match self.fetcher.fetch(url.as_url()) {
                        Ok(document) => {
                            let more = self.extractors.has_next_page(&document);
                            self.state = WalkState::HasPage {
                                url: url.clone(),
                                index,
                                more,
                            };
                            self.yielded += 1;
                            return Some(Page {
                                index,
                                url,
                                document,
                            });
                        }
                        Err(e) => {
                            warn!(page = index, url = %url, error = %e, "page fetch failed");
                            self.failure = Some(e);
                            self.state = WalkState::Failed;
                            return None;
                        }
                    }
                }
                WalkState::HasPage { url, index, more } => {
                    if !more {
                        return None;
                    }
                    let next = index + 1;
                    self.state = WalkState::Fetching {
                        url: self.normalizer.next_page(&url, next),
                        index: next,
                    };
                }
                WalkState::Exhausted => return None,
                WalkState::Failed => {
                    self.state = WalkState::Failed;
                    return None;
                }
            }
        }
    }
}

impl<F: PageFetcher> FusedIterator for CategoryPages<'_, F> {}
