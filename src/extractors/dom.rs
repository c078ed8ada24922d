//! DOM helpers on top of `scraper`

use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapeError};
use crate::fetcher::Document;
use crate::text::{clean_text, element_text};

/// Compile a built-in selector.
pub(crate) fn css(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ScrapeError::Selector(selector.to_string()))
}

/// First descendant of `scope` matching `selector`.
pub(crate) fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Raw text of the first descendant matching `selector`.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(scope, selector).map(|el| element_text(&el))
}

/// First element after `anchor` in document order that matches `selector`.
///
/// Looks at the anchor's own descendants first, then everything that
/// follows it (siblings of the anchor and of each ancestor, depth first).
pub(crate) fn find_next<'a>(anchor: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    let hit = |node| ElementRef::wrap(node).filter(|el| selector.matches(el));

    if let Some(found) = anchor.descendants().skip(1).find_map(hit) {
        return Some(found);
    }

    let mut current = Some(*anchor);
    while let Some(node) = current {
        for sibling in node.next_siblings() {
            if let Some(found) = sibling.descendants().find_map(hit) {
                return Some(found);
            }
        }
        current = node.parent();
    }
    None
}

/// Page-level selectors: category heading and the "show more" marker.
pub(crate) struct PageSelectors {
    title_span: Selector,
    any_h1: Selector,
    show_more: Selector,
}

impl PageSelectors {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            title_span: css("h1.cnc-title-xl span")?,
            any_h1: css("h1")?,
            show_more: css("div.cnc-pagination__show-more")?,
        })
    }

    pub(crate) fn title(&self, doc: &Document) -> Option<String> {
        let heading = doc
            .select_first(&self.title_span)
            .or_else(|| doc.select_first(&self.any_h1))?;
        let title = clean_text(&element_text(&heading));
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }

    pub(crate) fn has_show_more(&self, doc: &Document) -> bool {
        doc.contains(&self.show_more)
    }
}
