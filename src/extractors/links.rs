//! Product link filtering and order-preserving deduplication

use std::collections::HashSet;

/// Keep hrefs that already carry an absolute `http(s)` scheme, dropping
/// repeats while preserving first-seen order.
pub fn keep_absolute_unique<I>(hrefs: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut set = LinkSet::default();
    set.extend(hrefs.into_iter().filter(|href| href.starts_with("http")));
    set.into_vec()
}

/// Accumulates links across pages: `[A, B, A, C]` becomes `[A, B, C]`.
#[derive(Debug, Default)]
pub struct LinkSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl LinkSet {
    /// Returns `true` when the link was not seen before.
    pub fn insert(&mut self, link: String) -> bool {
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.ordered.push(link);
        true
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

impl Extend<String> for LinkSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for link in iter {
            self.insert(link);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedup_preserves_order() {
        let links = ["A", "B", "A", "C"].map(|s| format!("https://x/{s}"));
        let out = keep_absolute_unique(links);
        assert_eq!(out, vec!["https://x/A", "https://x/B", "https://x/C"]);
    }

    #[test]
    fn test_relative_links_dropped() {
        let out = keep_absolute_unique(owned(&[
            "/p/1",
            "https://site.ru/p/2",
            "javascript:void(0)",
            "http://site.ru/p/3",
            "#reviews",
        ]));
        assert_eq!(out, vec!["https://site.ru/p/2", "http://site.ru/p/3"]);
    }

    #[test]
    fn test_link_set_across_pages() {
        let mut set = LinkSet::default();
        set.extend(owned(&["a", "b"]));
        assert!(set.insert("c".to_string()));
        assert!(!set.insert("a".to_string()));
        set.extend(owned(&["b", "d"]));

        assert_eq!(set.len(), 4);
        assert_eq!(set.into_vec(), owned(&["a", "b", "c", "d"]));
    }
}
