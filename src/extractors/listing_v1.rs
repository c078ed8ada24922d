//! v1 listing layout: one `cnc-product-categories-mob-card` per product

use scraper::{ElementRef, Selector};

use super::dom::{css, first, first_text};
use super::{Layout, LayoutExtractor, ProductSummaryRow, RowDefaults};
use crate::error::Result;
use crate::fetcher::Document;
use crate::text::{clean_listing_text, element_text};

pub struct CardLayout {
    defaults: RowDefaults,
    card: Selector,
    header: Selector,
    link: Selector,
    brand: Selector,
    sku_block: Selector,
    sku_code: Selector,
    price: Selector,
    quantity: Selector,
    status: Selector,
    product_hrefs: Selector,
}

impl CardLayout {
    pub(crate) fn new(defaults: RowDefaults) -> Result<Self> {
        Ok(Self {
            defaults,
            card: css("div.cnc-product-categories-mob-card")?,
            header: css("div.cnc-product-categories-mob-card__header")?,
            link: css("a")?,
            brand: css("span.cnc-product-categories-mob-card__brand")?,
            sku_block: css("span.cnc-product-categories-mob-card__sku")?,
            sku_code: css("span.cnc-sku__product-code")?,
            price: css("div.cnc-product-categories-mob-card__current-price")?,
            quantity: css("span.cnc-product-amount__product-quantity")?,
            status: css("span.cnc-product-amount__status")?,
            product_hrefs: css("div.cnc-product-categories-mob-card__header a[href]")?,
        })
    }

    fn row(&self, card: ElementRef<'_>) -> Option<ProductSummaryRow> {
        let header = first(card, &self.header)?;
        let name = clean_listing_text(&element_text(&first(header, &self.link)?));
        if name.is_empty() {
            return None;
        }

        // Brand label normally sits in the header; some cards move it below.
        let brand = first_text(header, &self.brand).or_else(|| first_text(card, &self.brand));

        let sku = first(card, &self.sku_block).and_then(|block| first_text(block, &self.sku_code));

        let availability =
            first_text(card, &self.quantity).or_else(|| first_text(card, &self.status));

        Some(ProductSummaryRow {
            name,
            brand: self.defaults.text_or_sentinel(brand),
            sku: self.defaults.sku_or_sentinel(sku),
            price: self.defaults.price_or_sentinel(first_text(card, &self.price)),
            availability: self.defaults.text_or_sentinel(availability),
        })
    }
}

impl LayoutExtractor for CardLayout {
    fn layout(&self) -> Layout {
        Layout::V1
    }

    fn product_hrefs(&self, doc: &Document) -> Vec<String> {
        doc.html()
            .select(&self.product_hrefs)
            .filter_map(|el| el.value().attr("href").map(String::from))
            .collect()
    }

    fn rows(&self, doc: &Document) -> Vec<ProductSummaryRow> {
        doc.html()
            .select(&self.card)
            .filter_map(|card| self.row(card))
            .collect()
    }
}
