//! Product detail page: core fields plus the feature table

use scraper::{ElementRef, Selector};
use tracing::debug;

use super::dom::css;
use super::{FeatureMap, ProductDetailRecord};
use crate::error::Result;
use crate::fetcher::Document;
use crate::text::{clean_text, element_text};

/// Why a single feature block was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureGap {
    NoLabel,
    EmptyLabel,
    NoValue,
}

pub struct DetailExtractor {
    sentinel: String,
    title: Selector,
    price: Selector,
    description: Selector,
    paragraphs: Selector,
    sku: Selector,
    feature: Selector,
    label: Selector,
    value_area: Selector,
    link: Selector,
    list: Selector,
    list_item: Selector,
}

impl DetailExtractor {
    pub fn new(sentinel: &str) -> Result<Self> {
        Ok(Self {
            sentinel: sentinel.to_string(),
            title: css("h1.cnc-product-detail__title")?,
            price: css("div.cnc-product-detail__price-actual span.ty-price-num")?,
            description: css("div.cnc-product-description__left")?,
            paragraphs: css("p:not(.cnc-product-description__notice)")?,
            sku: css("span.cnc-product-detail__product-code")?,
            feature: css("div.cnc-product-features__feature")?,
            label: css("span.cnc-product-features__label")?,
            value_area: css("div")?,
            link: css("a")?,
            list: css("ul")?,
            list_item: css("li")?,
        })
    }

    /// Extract one record. Never fails: missing core fields get the
    /// sentinel and unreadable feature blocks are left out.
    pub fn extract(&self, doc: &Document) -> ProductDetailRecord {
        let text_of = |selector: &Selector| {
            doc.select_first(selector)
                .map(|el| clean_text(&element_text(&el)))
                .filter(|t| !t.is_empty())
        };

        let record = ProductDetailRecord {
            title: self.or_sentinel(text_of(&self.title)),
            price: self.or_sentinel(text_of(&self.price)),
            description: self.or_sentinel(self.description(doc)),
            sku: self.or_sentinel(text_of(&self.sku)),
            features: self.features(doc),
        };
        debug!(
            url = doc.url(),
            features = record.features.len(),
            "extracted product detail"
        );
        record
    }

    fn or_sentinel(&self, value: Option<String>) -> String {
        value.unwrap_or_else(|| self.sentinel.clone())
    }

    fn description(&self, doc: &Document) -> Option<String> {
        let block = doc.select_first(&self.description)?;
        let parts: Vec<String> = block
            .select(&self.paragraphs)
            .map(|p| clean_text(&element_text(&p)))
            .filter(|t| !t.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    fn features(&self, doc: &Document) -> FeatureMap {
        let mut features = FeatureMap::new();
        for (index, block) in doc.html().select(&self.feature).enumerate() {
            match self.parse_feature(block) {
                Ok((label, value)) => {
                    features.insert(label, value);
                }
                Err(gap) => debug!(url = doc.url(), index, ?gap, "skipping feature block"),
            }
        }
        features
    }

    /// Value priority: link text, then list items joined by `", "`, then
    /// the plain text of the value area.
    fn parse_feature(&self, block: ElementRef<'_>) -> std::result::Result<(String, String), FeatureGap> {
        let label = block.select(&self.label).next().ok_or(FeatureGap::NoLabel)?;
        let label = clean_text(&element_text(&label));
        let label = label.trim_end_matches(':').trim_end().to_string();
        if label.is_empty() {
            return Err(FeatureGap::EmptyLabel);
        }

        let area = block.select(&self.value_area).next().ok_or(FeatureGap::NoValue)?;

        let value = if let Some(link) = area.select(&self.link).next() {
            clean_text(&element_text(&link))
        } else if area.select(&self.list).next().is_some() {
            area.select(&self.list_item)
                .map(|li| clean_text(&element_text(&li)))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            clean_text(&element_text(&area))
        };

        Ok((label, value))
    }
}
