//! Seed cleaning, batch validation and category URL normalization
//!
//! A category URL is canonicalized to `.../page-1/?items_per_page=<N>`;
//! successor pages only rewrite the trailing `page-<N>` segment.

use std::fmt;
use url::Url;

use crate::error::{Result, ScrapeError};

pub const PAGE_SIZE_PARAM: &str = "items_per_page";
const PAGE_PREFIX: &str = "page-";

/// A normalized listing page URL.
///
/// The path always ends in `/page-<N>/` and the query carries the page size
/// parameter exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUrl(Url);

impl CategoryUrl {
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Page index from the trailing `page-<N>` segment.
    pub fn page_index(&self) -> Option<u32> {
        let trimmed = self.0.path().strip_suffix('/')?;
        let (_, last) = trimmed.rsplit_once('/')?;
        page_number(last)
    }
}

impl fmt::Display for CategoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Canonicalizes category URLs for one deployment.
#[derive(Debug, Clone, Copy)]
pub struct UrlNormalizer {
    page_size: u32,
}

impl UrlNormalizer {
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Page 1 form of `url`; idempotent.
    pub fn normalize(&self, url: &Url) -> CategoryUrl {
        let mut out = url.clone();

        let mut path = strip_page_segment(url.path()).to_string();
        if path.is_empty() {
            path.push('/');
        }
        if !path.ends_with('/') {
            path.push('/');
        }
        if !ends_with_first_page(&path) {
            path.push_str(PAGE_PREFIX);
            path.push_str("1/");
        }
        out.set_path(&path);

        let page_size = self.page_size.to_string();
        let pairs = merged_query(url, PAGE_SIZE_PARAM, &page_size);
        out.query_pairs_mut().clear().extend_pairs(pairs);

        CategoryUrl(out)
    }

    /// URL of page `index` in the same category; query untouched.
    pub fn next_page(&self, current: &CategoryUrl, index: u32) -> CategoryUrl {
        let mut out = current.0.clone();
        let base = strip_page_segment(current.0.path());
        let mut path = base.to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(&format!("{PAGE_PREFIX}{index}/"));
        out.set_path(&path);
        CategoryUrl(out)
    }
}

/// Query pairs as a key -> value mapping: first position wins, last value
/// wins, and `key` is overwritten (or appended) with `value`.
fn merged_query(url: &Url, key: &str, value: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (k, v) in url.query_pairs() {
        match pairs.iter_mut().find(|(existing, _)| *existing == k) {
            Some(slot) => slot.1 = v.into_owned(),
            None => pairs.push((k.into_owned(), v.into_owned())),
        }
    }
    match pairs.iter_mut().find(|(existing, _)| existing == key) {
        Some(slot) => slot.1 = value.to_string(),
        None => pairs.push((key.to_string(), value.to_string())),
    }
    pairs
}

/// Drop one trailing `/page-<N>` or `/page-<N>/`, keeping the slash before it.
fn strip_page_segment(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rsplit_once('/') {
        Some((head, last)) if is_page_segment(last) => &path[..head.len() + 1],
        _ => path,
    }
}

fn ends_with_first_page(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    trimmed.len() < path.len() && trimmed.ends_with("/page-1")
}

/// `page-` followed by any run of ASCII digits, however long.
fn is_page_segment(segment: &str) -> bool {
    segment
        .strip_prefix(PAGE_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn page_number(segment: &str) -> Option<u32> {
    if !is_page_segment(segment) {
        return None;
    }
    segment[PAGE_PREFIX.len()..].parse().ok()
}

/// Clean raw operator input: trim, drop blanks, default the scheme to
/// `http://`, strip trailing slashes, dedup keeping first occurrence.
pub fn normalize_seeds<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cleaned: Vec<String> = Vec::new();
    for item in raw {
        let link = item.as_ref().trim();
        if link.is_empty() {
            continue;
        }
        let mut link = if has_http_scheme(link) {
            link.to_string()
        } else {
            format!("http://{link}")
        };
        while link.ends_with('/') {
            link.pop();
        }
        if !cleaned.contains(&link) {
            cleaned.push(link);
        }
    }
    cleaned
}

/// All-or-nothing validation of a cleaned seed list.
///
/// An empty list, or any seed outside `scheme://host/...` with the allowed
/// character set, fails the whole batch and names every offender.
pub fn validate_seeds(seeds: &[String]) -> Result<Vec<Url>> {
    if seeds.is_empty() {
        return Err(ScrapeError::InvalidUrl(Vec::new()));
    }

    let mut invalid: Vec<String> = Vec::new();
    let mut parsed: Vec<Url> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        match parse_seed(seed) {
            Some(url) => parsed.push(url),
            None => invalid.push(seed.clone()),
        }
    }

    if invalid.is_empty() {
        Ok(parsed)
    } else {
        Err(ScrapeError::InvalidUrl(invalid))
    }
}

fn parse_seed(seed: &str) -> Option<Url> {
    let rest = strip_http_scheme(seed)?;
    if rest.is_empty() || !rest.chars().all(is_allowed_url_char) {
        return None;
    }
    let url = Url::parse(seed).ok()?;
    url.host_str()?;
    Some(url)
}

fn is_allowed_url_char(c: char) -> bool {
    c.is_alphanumeric() || "_-.:/?#=&%~+".contains(c)
}

fn has_http_scheme(link: &str) -> bool {
    strip_http_scheme(link).is_some()
}

fn strip_http_scheme(link: &str) -> Option<&str> {
    for scheme in ["http://", "https://"] {
        if link.len() >= scheme.len()
            && link.is_char_boundary(scheme.len())
            && link[..scheme.len()].eq_ignore_ascii_case(scheme)
        {
            return Some(&link[scheme.len()..]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn normalizer() -> UrlNormalizer {
        UrlNormalizer::new(48)
    }

    #[test]
    fn test_normalize_plain_category() {
        let out = normalizer().normalize(&url("https://site.ru/catalog/filters"));
        assert_eq!(
            out.as_str(),
            "https://site.ru/catalog/filters/page-1/?items_per_page=48"
        );
        assert_eq!(out.page_index(), Some(1));
    }

    #[test]
    fn test_normalize_replaces_existing_page_segment() {
        for raw in [
            "https://site.ru/catalog/filters/page-7/",
            "https://site.ru/catalog/filters/page-7",
            "https://site.ru/catalog/filters/page-12/?sort=price&items_per_page=10&a=1",
        ] {
            let out = normalizer().normalize(&url(raw));
            assert_eq!(out.as_url().path(), "/catalog/filters/page-1/", "{raw}");
            let count = out
                .as_url()
                .query_pairs()
                .filter(|(k, _)| k == PAGE_SIZE_PARAM)
                .count();
            assert_eq!(count, 1, "{raw}");
        }
    }

    #[test]
    fn test_normalize_strips_oversized_page_number() {
        let out = normalizer().normalize(&url("https://site.ru/cat/page-99999999999/"));
        assert_eq!(out.as_url().path(), "/cat/page-1/");
        assert_eq!(
            normalizer().next_page(&out, 2).as_url().path(),
            "/cat/page-2/"
        );
    }

    #[test]
    fn test_normalize_preserves_query_order() {
        let out = normalizer().normalize(&url(
            "https://site.ru/cat/?sort=price&items_per_page=10&order=asc",
        ));
        assert_eq!(
            out.as_url().query(),
            Some("sort=price&items_per_page=48&order=asc")
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let n = normalizer();
        for raw in [
            "https://site.ru/cat",
            "https://site.ru/cat/page-3/?q=a+b&x=",
            "http://site.ru/",
            "http://site.ru",
        ] {
            let once = n.normalize(&url(raw));
            let twice = n.normalize(once.as_url());
            assert_eq!(once, twice, "{raw}");
        }
    }

    #[test]
    fn test_normalize_site_root() {
        let out = normalizer().normalize(&url("http://site.ru"));
        assert_eq!(out.as_str(), "http://site.ru/page-1/?items_per_page=48");
    }

    #[test]
    fn test_normalize_uses_configured_page_size() {
        let out = UrlNormalizer::new(3000).normalize(&url("https://site.ru/cat"));
        assert_eq!(out.as_url().query(), Some("items_per_page=3000"));
    }

    #[test]
    fn test_next_page_twice_matches_page_three() {
        let n = normalizer();
        let first = n.normalize(&url("https://site.ru/cat/?sort=name"));
        let second = n.next_page(&first, 2);
        let third = n.next_page(&second, 3);
        assert_eq!(third.as_url().path(), "/cat/page-3/");
        assert_eq!(third.page_index(), Some(3));
        assert_eq!(third.as_url().query(), first.as_url().query());

        let direct = n.normalize(&url("https://site.ru/cat/page-3/?sort=name"));
        assert_eq!(direct.as_url().query(), third.as_url().query());
    }

    #[test]
    fn test_normalize_seeds() {
        let raw = vec![
            "  site.ru/cat-a/ ",
            "",
            "https://site.ru/cat-b",
            "http://site.ru/cat-a",
            "HTTPS://site.ru/cat-c//",
            "   ",
        ];
        assert_eq!(
            normalize_seeds(raw),
            vec![
                "http://site.ru/cat-a".to_string(),
                "https://site.ru/cat-b".to_string(),
                "HTTPS://site.ru/cat-c".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_empty_batch() {
        match validate_seeds(&[]) {
            Err(ScrapeError::InvalidUrl(bad)) => assert!(bad.is_empty()),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_is_all_or_nothing() {
        let seeds = vec![
            "https://site.ru/good".to_string(),
            "https://site.ru/bad path".to_string(),
            "https://site.ru/also<bad>".to_string(),
        ];
        match validate_seeds(&seeds) {
            Err(ScrapeError::InvalidUrl(bad)) => {
                assert_eq!(bad, vec![seeds[1].clone(), seeds[2].clone()]);
            }
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_unicode_paths() {
        let seeds = vec!["https://site.ru/каталог/фильтры?x=1".to_string()];
        let urls = validate_seeds(&seeds).unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].host_str(), Some("site.ru"));
    }
}
