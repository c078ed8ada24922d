//! Scraper configuration
//!
//! Everything here is a per-deployment constant. Operators may override the
//! defaults with a TOML file; the page size is deliberately not a CLI flag.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ScrapeError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Placeholder for fields that could not be extracted.
pub const SENTINEL: &str = "Н/Д";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub user_agent: String,
    /// Whole-request timeout handed to the HTTP agent
    pub request_timeout_secs: u64,
    /// `items_per_page` value forced onto every category URL (48 or 3000 on
    /// the known site variants)
    pub page_size: u32,
    /// Prefix put in front of every listing SKU, joined with `-`
    pub site_code: String,
    pub sentinel: String,
    /// Pause between product detail fetches in start mode
    pub detail_delay_ms: u64,
    pub catalog_output: String,
    pub start_output: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            page_size: 48,
            site_code: "119".to_string(),
            sentinel: SENTINEL.to_string(),
            detail_delay_ms: 100,
            catalog_output: "product_list.xlsx".to_string(),
            start_output: "products.xlsx".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let config: ScraperConfig = toml::from_str(&content).map_err(|e| {
            ScrapeError::Config(format!("failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reports every problem at once.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let mut errors: Vec<String> = Vec::new();

        if self.page_size == 0 {
            errors.push("page_size must be positive".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be positive".to_string());
        }
        if self.site_code.trim().is_empty() {
            errors.push("site_code must not be empty".to_string());
        }
        if self.user_agent.trim().is_empty() {
            errors.push("user_agent must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScrapeError::Config(errors.join("; ")))
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }
}
