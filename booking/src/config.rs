//! Configuration for the booking client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default quiet interval before a search query is applied
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Default number of venues per page
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Default image shown for venues without media
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/800x600?text=No+image";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Search debounce in milliseconds (`HAVEN_SEARCH_DEBOUNCE_MS`, default: 500)
    pub search_debounce_ms: u64,
    /// Venues per page (`HAVEN_PAGE_SIZE`, default: 24)
    pub page_size: u32,
    /// Tracing filter directive (`HAVEN_LOG_LEVEL`, default: info)
    pub log_level: String,
    /// Placeholder image URL (`HAVEN_PLACEHOLDER_IMAGE_URL`)
    pub placeholder_image_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            search_debounce_ms: lookup("HAVEN_SEARCH_DEBOUNCE_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_debounce_ms),
            page_size: lookup("HAVEN_PAGE_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            log_level: lookup("HAVEN_LOG_LEVEL").unwrap_or(defaults.log_level),
            placeholder_image_url: lookup("HAVEN_PLACEHOLDER_IMAGE_URL")
                .unwrap_or(defaults.placeholder_image_url),
        }
    }

    /// Search debounce as a duration
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
