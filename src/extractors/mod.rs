//! Site markup extractors
//!
//! The catalog is served in two layouts:
//! - v1: mobile card rows (`cnc-product-categories-mob-card`)
//! - v2: short-list blocks (`cnc-short-list-product`) without a row container
//!
//! Each layout is a [`LayoutExtractor`]. [`first_non_empty`] tries them in
//! order and keeps the first one that finds anything; results from the two
//! layouts are never merged.

mod detail;
mod dom;
mod links;
mod listing_v1;
mod listing_v2;

pub use detail::DetailExtractor;
pub use links::{LinkSet, keep_absolute_unique};
pub use listing_v1::CardLayout;
pub use listing_v2::ShortListLayout;

use serde::Serialize;

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::fetcher::Document;
use crate::text::clean_listing_text;

/// One catalog listing entry. All five fields are always filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummaryRow {
    pub name: String,
    pub brand: String,
    pub sku: String,
    pub price: String,
    pub availability: String,
}

impl ProductSummaryRow {
    pub const HEADERS: [&'static str; 5] = ["Название", "Бренд", "Артикул", "Цена", "Наличие"];

    pub fn cells(&self) -> [&str; 5] {
        [
            &self.name,
            &self.brand,
            &self.sku,
            &self.price,
            &self.availability,
        ]
    }
}

/// Feature label -> value, in first-seen order.
///
/// Inserting a label that is already present overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureMap {
    entries: Vec<(String, String)>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous value when `label` was already present.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == label) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.entries.push((label, value));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One product detail page: four fixed fields plus its feature table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetailRecord {
    pub title: String,
    pub price: String,
    pub description: String,
    pub sku: String,
    pub features: FeatureMap,
}

impl ProductDetailRecord {
    pub const CORE_HEADERS: [&'static str; 4] = ["Товар", "Цена", "Описание", "Артикул"];

    pub fn core_cells(&self) -> [&str; 4] {
        [&self.title, &self.price, &self.description, &self.sku]
    }
}

/// Known markup variants of the catalog site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layout {
    V1,
    V2,
}

/// Extraction strategy for one markup variant.
pub trait LayoutExtractor {
    fn layout(&self) -> Layout;

    /// Raw `href` values of product links, in DOM order.
    fn product_hrefs(&self, doc: &Document) -> Vec<String>;

    /// Summary rows in DOM order; nameless rows are already dropped.
    fn rows(&self, doc: &Document) -> Vec<ProductSummaryRow>;
}

/// Run `extract` against each candidate in order and return the first
/// non-empty result together with the layout that produced it.
pub fn first_non_empty<T>(
    candidates: &[&dyn LayoutExtractor],
    mut extract: impl FnMut(&dyn LayoutExtractor) -> Vec<T>,
) -> Option<(Layout, Vec<T>)> {
    candidates.iter().find_map(|candidate| {
        let items = extract(*candidate);
        if items.is_empty() {
            None
        } else {
            Some((candidate.layout(), items))
        }
    })
}

/// Sentinel and SKU prefix applied by the listing extractors
#[derive(Debug, Clone)]
pub(crate) struct RowDefaults {
    pub(crate) sentinel: String,
    site_code: String,
}

impl RowDefaults {
    pub(crate) fn from_config(config: &ScraperConfig) -> Self {
        Self {
            sentinel: config.sentinel.clone(),
            site_code: config.site_code.clone(),
        }
    }

    pub(crate) fn text_or_sentinel(&self, raw: Option<String>) -> String {
        raw.map(|t| clean_listing_text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.sentinel.clone())
    }

    pub(crate) fn sku_or_sentinel(&self, raw: Option<String>) -> String {
        raw.map(|t| clean_listing_text(&t))
            .filter(|t| !t.is_empty())
            .map(|code| format!("{}-{}", self.site_code, code))
            .unwrap_or_else(|| self.sentinel.clone())
    }

    pub(crate) fn price_or_sentinel(&self, raw: Option<String>) -> String {
        raw.map(|t| crate::text::clean_price(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.sentinel.clone())
    }
}

/// All extractors for the site, with selectors compiled once.
pub struct SiteExtractors {
    cards: CardLayout,
    short_list: ShortListLayout,
    detail: DetailExtractor,
    page: dom::PageSelectors,
}

impl SiteExtractors {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let defaults = RowDefaults::from_config(config);
        Ok(Self {
            cards: CardLayout::new(defaults.clone())?,
            short_list: ShortListLayout::new(defaults)?,
            detail: DetailExtractor::new(&config.sentinel)?,
            page: dom::PageSelectors::new()?,
        })
    }

    fn layouts(&self) -> [&dyn LayoutExtractor; 2] {
        [&self.cards, &self.short_list]
    }

    /// Listing rows from whichever layout matches first.
    pub fn listing_rows(&self, doc: &Document) -> (Option<Layout>, Vec<ProductSummaryRow>) {
        match first_non_empty(&self.layouts(), |layout| layout.rows(doc)) {
            Some((layout, rows)) => (Some(layout), rows),
            None => (None, Vec::new()),
        }
    }

    /// Absolute product links, deduplicated in first-seen order.
    pub fn product_links(&self, doc: &Document) -> Vec<String> {
        first_non_empty(&self.layouts(), |layout| {
            keep_absolute_unique(layout.product_hrefs(doc))
        })
        .map(|(_, links)| links)
        .unwrap_or_default()
    }

    /// Category heading, if the page has one.
    pub fn category_title(&self, doc: &Document) -> Option<String> {
        self.page.title(doc)
    }

    pub fn product_detail(&self, doc: &Document) -> ProductDetailRecord {
        self.detail.extract(doc)
    }

    pub fn has_next_page(&self, doc: &Document) -> bool {
        self.page.has_show_more(doc)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! HTML fixtures shared by extractor, walker and aggregator tests.

    pub(crate) const SHOW_MORE: &str =
        r#"<div class="cnc-pagination__show-more"><a href="?page=2">Показать ещё</a></div>"#;

    /// A v1 card row.
    pub(crate) fn v1_card(name: &str, href: &str, code: &str, price: &str) -> String {
        format!(
            r#"
            <div class="cnc-product-categories-mob-card">
                <div class="cnc-product-categories-mob-card__header">
                    <a href="{href}">{name}</a>
                    <span class="cnc-product-categories-mob-card__brand">Бренд:&nbsp;Grohe</span>
                </div>
                <span class="cnc-product-categories-mob-card__sku">
                    Код: <span class="cnc-sku__product-code">{code}</span>
                </span>
                <div class="cnc-product-categories-mob-card__current-price">{price}&nbsp;₽</div>
                <span class="cnc-product-amount__product-quantity">В наличии 5 шт.</span>
            </div>
            "#
        )
    }

    /// A v2 short-list block.
    pub(crate) fn v2_block(name: &str, href: &str, code: &str, price: &str) -> String {
        format!(
            r#"
            <div class="cnc-short-list-product">
                <a class="cnc-short-list-product__image" href="{href}"><img src="x.jpg"></a>
            </div>
            <div class="cnc-short-list-product__info">
                <a href="{href}">{name}</a>
            </div>
            <div class="cnc-short-list-product__short-info">
                <div class="cnc-short-list-product__brand-name">Hansgrohe</div>
                <span class="cnc-sku__product-code">{code}</span>
            </div>
            <span class="ty-price"><span class="ty-price-num">{price}</span>&nbsp;₽</span>
            <span class="cnc-product-amount__status"><span>Под заказ</span></span>
            "#
        )
    }

    pub(crate) fn listing_page(title: &str, body: &str, more: bool) -> String {
        format!(
            r#"<html><body>
            <h1 class="cnc-title-xl"><span>{title}</span></h1>
            {body}
            {}
            </body></html>"#,
            if more { SHOW_MORE } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn extractors() -> SiteExtractors {
        SiteExtractors::new(&ScraperConfig::default()).unwrap()
    }

    #[test]
    fn test_feature_map_overwrites_in_place() {
        let mut map = FeatureMap::new();
        assert_eq!(map.insert("Материал", "Сталь"), None);
        map.insert("Цвет", "Хром");
        assert_eq!(map.insert("Материал", "Латунь"), Some("Сталь".to_string()));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Материал"), Some("Латунь"));
        assert_eq!(map.labels().collect::<Vec<_>>(), vec!["Материал", "Цвет"]);
    }

    #[test]
    fn test_sku_uses_configured_site_code() {
        let defaults = RowDefaults::from_config(&ScraperConfig {
            site_code: "207".to_string(),
            ..ScraperConfig::default()
        });
        assert_eq!(defaults.sku_or_sentinel(Some(" 12345 ".to_string())), "207-12345");
        assert_eq!(defaults.sku_or_sentinel(Some("  ".to_string())), "Н/Д");
        assert_eq!(defaults.sku_or_sentinel(None), "Н/Д");
    }

    #[test]
    fn test_v2_only_document_falls_back() {
        let body = [
            v2_block("Смеситель A", "https://site.ru/a", "111", "1 000"),
            v2_block("Смеситель B", "https://site.ru/b", "222", "2 000"),
            v2_block("Смеситель C", "https://site.ru/c", "333", "3 000"),
        ]
        .concat();
        let doc = Document::parse("https://site.ru/cat", &listing_page("Смесители", &body, false));

        let (layout, rows) = extractors().listing_rows(&doc);
        assert_eq!(layout, Some(Layout::V2));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].name, "Смеситель B");
    }

    #[test]
    fn test_document_matching_both_uses_v1_only() {
        let body = [
            v1_card("Фильтр 1", "https://site.ru/f1", "10", "500"),
            v2_block("Смеситель A", "https://site.ru/a", "111", "1 000"),
            v2_block("Смеситель B", "https://site.ru/b", "222", "2 000"),
        ]
        .concat();
        let doc = Document::parse("https://site.ru/cat", &listing_page("Смесь", &body, false));
        let ex = extractors();

        let (layout, rows) = ex.listing_rows(&doc);
        assert_eq!(layout, Some(Layout::V1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Фильтр 1");

        assert_eq!(ex.product_links(&doc), vec!["https://site.ru/f1".to_string()]);
    }

    #[test]
    fn test_no_layout_matches() {
        let doc = Document::parse("https://site.ru/cat", "<html><body><p>пусто</p></body></html>");
        let ex = extractors();
        assert_eq!(ex.listing_rows(&doc), (None, Vec::new()));
        assert!(ex.product_links(&doc).is_empty());
    }

    #[test]
    fn test_category_title_and_show_more() {
        let ex = extractors();
        let doc = Document::parse(
            "https://site.ru/cat",
            &listing_page("  Фильтры&nbsp;для воды ", "", true),
        );
        assert_eq!(ex.category_title(&doc), Some("Фильтры для воды".to_string()));
        assert!(ex.has_next_page(&doc));

        let plain = Document::parse("https://site.ru/cat", "<h1> Краны </h1>");
        assert_eq!(ex.category_title(&plain), Some("Краны".to_string()));
        assert!(!ex.has_next_page(&plain));

        let untitled = Document::parse("https://site.ru/cat", "<div></div>");
        assert_eq!(ex.category_title(&untitled), None);
    }
}
