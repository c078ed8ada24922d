//! v2 listing layout: `cnc-short-list-product` blocks
//!
//! There is no row container here. Each product starts at a
//! `div.cnc-short-list-product` anchor and its fields follow it in document
//! order, so everything past the anchor is located with [`find_next`].

use scraper::{ElementRef, Selector};

use super::dom::{css, find_next, first, first_text};
use super::{Layout, LayoutExtractor, ProductSummaryRow, RowDefaults};
use crate::error::Result;
use crate::fetcher::Document;
use crate::text::{clean_listing_text, element_text};

pub struct ShortListLayout {
    defaults: RowDefaults,
    anchor: Selector,
    link: Selector,
    info: Selector,
    short_info: Selector,
    brand: Selector,
    sku_code: Selector,
    price: Selector,
    status: Selector,
    nested_span: Selector,
    product_hrefs: Selector,
}

impl ShortListLayout {
    pub(crate) fn new(defaults: RowDefaults) -> Result<Self> {
        Ok(Self {
            defaults,
            anchor: css("div.cnc-short-list-product")?,
            link: css("a")?,
            info: css("div.cnc-short-list-product__info")?,
            short_info: css("div.cnc-short-list-product__short-info")?,
            brand: css("div.cnc-short-list-product__brand-name")?,
            sku_code: css("span.cnc-sku__product-code")?,
            price: css("span.ty-price")?,
            status: css("span.cnc-product-amount__status")?,
            nested_span: css("span")?,
            product_hrefs: css("div.cnc-short-list-product a[href]")?,
        })
    }

    fn row(&self, anchor: ElementRef<'_>) -> Option<ProductSummaryRow> {
        first(anchor, &self.link)?;

        let info = find_next(anchor, &self.info)?;
        let name = clean_listing_text(&element_text(&first(info, &self.link)?));
        if name.is_empty() {
            return None;
        }

        let short_info = find_next(anchor, &self.short_info);
        let brand = short_info.and_then(|block| first_text(block, &self.brand));
        let sku = short_info.and_then(|block| first_text(block, &self.sku_code));

        let price = find_next(anchor, &self.price).map(|el| element_text(&el));
        let availability = find_next(anchor, &self.status)
            .and_then(|status| first_text(status, &self.nested_span));

        Some(ProductSummaryRow {
            name,
            brand: self.defaults.text_or_sentinel(brand),
            sku: self.defaults.sku_or_sentinel(sku),
            price: self.defaults.price_or_sentinel(price),
            availability: self.defaults.text_or_sentinel(availability),
        })
    }
}

impl LayoutExtractor for ShortListLayout {
    fn layout(&self) -> Layout {
        Layout::V2
    }

    fn product_hrefs(&self, doc: &Document) -> Vec<String> {
        doc.html()
            .select(&self.product_hrefs)
            .filter_map(|el| el.value().attr("href").map(String::from))
            .collect()
    }

    fn rows(&self, doc: &Document) -> Vec<ProductSummaryRow> {
        doc.html()
            .select(&self.anchor)
            .filter_map(|anchor| self.row(anchor))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::v2_block;
    use super::*;
    use crate::config::{ScraperConfig, SENTINEL};

    fn layout() -> ShortListLayout {
        ShortListLayout::new(RowDefaults::from_config(&ScraperConfig::default())).unwrap()
    }

    fn doc(body: &str) -> Document {
        Document::parse("https://site.ru/cat/page-1/", body)
    }

    #[test]
    fn test_block_fields() {
        let html = v2_block("Смеситель для кухни", "https://site.ru/p/9", "7731", "12 490");
        let rows = layout().rows(&doc(&html));

        assert_eq!(
            rows,
            vec![ProductSummaryRow {
                name: "Смеситель для кухни".to_string(),
                brand: "Hansgrohe".to_string(),
                sku: "119-7731".to_string(),
                price: "12490".to_string(),
                availability: "Под заказ".to_string(),
            }]
        );
    }

    #[test]
    fn test_each_block_reads_its_own_fields() {
        let html = [
            v2_block("Первый", "https://site.ru/1", "1", "100"),
            v2_block("Второй", "https://site.ru/2", "2", "200"),
        ]
        .concat();
        let rows = layout().rows(&doc(&html));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "119-1");
        assert_eq!(rows[1].name, "Второй");
        assert_eq!(rows[1].sku, "119-2");
        assert_eq!(rows[1].price, "200");
    }

    #[test]
    fn test_status_without_nested_span() {
        let html = r#"
        <div class="cnc-short-list-product"><a href="/p">img</a></div>
        <div class="cnc-short-list-product__info"><a href="/p">Душ</a></div>
        <span class="cnc-product-amount__status">Нет</span>"#;
        let rows = layout().rows(&doc(html));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Душ");
        assert_eq!(rows[0].brand, SENTINEL);
        assert_eq!(rows[0].sku, SENTINEL);
        assert_eq!(rows[0].price, SENTINEL);
        assert_eq!(rows[0].availability, SENTINEL);
    }

    #[test]
    fn test_anchor_without_link_or_name_is_dropped() {
        let html = r#"
        <div class="cnc-short-list-product"><img src="x.jpg"></div>
        <div class="cnc-short-list-product__info"><a href="/p">Без якоря</a></div>"#;
        assert!(layout().rows(&doc(html)).is_empty());

        let nameless = r#"<div class="cnc-short-list-product"><a href="/p">img</a></div>"#;
        assert!(layout().rows(&doc(nameless)).is_empty());
    }
}
