//! Text cleaning shared by every extractor

use scraper::ElementRef;

const NBSP: char = '\u{a0}';
const NBSP_ENTITY: &str = "&nbsp;";
const BRAND_LABEL: &str = "Бренд: ";

/// Replace non-breaking spaces (the character and the literal entity),
/// collapse whitespace runs to one space, trim.
pub fn clean_text(text: &str) -> String {
    let replaced = text.replace(NBSP, " ").replace(NBSP_ENTITY, " ");
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Listing cells sometimes carry a `Бренд: ` label in front of the value.
pub fn clean_listing_text(text: &str) -> String {
    let replaced = text.replace(NBSP, " ").replace(NBSP_ENTITY, " ");
    clean_text(&replaced.replace(BRAND_LABEL, ""))
}

/// Keep digits and decimal separators only ("1 299,00 ₽" -> "1299,00").
pub fn clean_price(text: &str) -> String {
    text.replace(NBSP_ENTITY, " ")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect()
}

/// Concatenated text of an element and its descendants.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}
