//! Page fetching
//!
//! [`PageFetcher`] is the seam between the crawl logic and the network. The
//! HTTP implementation is a blocking `ureq` agent; the crawl is strictly
//! sequential so nothing here needs an async runtime.

use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::ScraperConfig;
use crate::error::FetchFailure;

/// A fetched and parsed HTML page.
pub struct Document {
    url: String,
    html: Html,
}

impl Document {
    pub fn parse(url: impl Into<String>, body: &str) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(body),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.select_first(selector).is_some()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("url", &self.url).finish()
    }
}

/// Resolves a URL to a parsed document, or reports why it could not.
///
/// Implementations must not panic on network or HTTP errors.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> Result<Document, FetchFailure>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    fn fetch(&self, url: &Url) -> Result<Document, FetchFailure> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP fetcher with charset detection.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(config.request_timeout()))
                .user_agent(config.user_agent.as_str())
                .build(),
        );
        Self { agent }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Document, FetchFailure> {
        let resp = match self.agent.get(url.as_str()).call() {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(FetchFailure::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Err(e) => {
                return Err(FetchFailure::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if !resp.status().is_success() {
            return Err(FetchFailure::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = resp
            .into_body()
            .read_to_vec()
            .map_err(|e| FetchFailure::Body {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let body = decode_body(&bytes, content_type.as_deref());
        Ok(Document::parse(url.as_str(), &body))
    }
}

/// Decode using the header charset, then a `<meta>` declaration, then UTF-8.
/// A label `encoding_rs` does not know counts as absent.
/// A byte order mark overrides all of them.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| {
            sniff_meta_charset(bytes).and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(4096)];
    let head = String::from_utf8_lossy(head);
    let re = regex::Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#).ok()?;
    re.captures(&head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header_charset() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("Фильтры");
        let text = decode_body(&bytes, Some("text/html; charset=windows-1251"));
        assert_eq!(text, "Фильтры");
    }

    #[test]
    fn test_decode_meta_charset() {
        let html = r#"<html><head><meta charset="windows-1251"></head><body>Сталь</body></html>"#;
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(html);
        let text = decode_body(&bytes, Some("text/html"));
        assert!(text.contains("Сталь"));
    }

    #[test]
    fn test_unknown_header_charset_falls_back_to_meta() {
        let html = r#"<html><head><meta charset="windows-1251"></head><body>Хром</body></html>"#;
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(html);
        let text = decode_body(&bytes, Some("text/html; charset=x-no-such-charset"));
        assert!(text.contains("Хром"));
    }

    #[test]
    fn test_decode_defaults_to_utf8() {
        let text = decode_body("Хром".as_bytes(), None);
        assert_eq!(text, "Хром");
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; Charset=\"UTF-8\""),
            Some("UTF-8".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_document_select() {
        let doc = Document::parse(
            "https://site.ru/",
            r#"<div class="cnc-pagination__show-more">ещё</div>"#,
        );
        let sel = Selector::parse("div.cnc-pagination__show-more").unwrap();
        assert!(doc.contains(&sel));
        assert_eq!(doc.url(), "https://site.ru/");
    }
}
