//! Environment-driven run configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file loaded in `main`. Every setting has a default, so an empty
//! environment reproduces the stock run.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_PAGES_TO_SCRAPE: u32 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON array of category names (`CATEGORIES_FILE`)
    pub categories_file: PathBuf,
    /// Where the aggregated results are written (`OUTPUT_FILE`)
    pub output_file: PathBuf,
    /// Page bound per category (`PAGES_TO_SCRAPE`)
    pub pages_to_scrape: u32,
    /// Pause after a page has rendered (`SETTLE_DELAY_MS`)
    pub settle_delay: Duration,
    /// Pause between page fetches (`PAGE_DELAY_MS`)
    pub page_delay: Duration,
    /// Upper bound on waiting for results to render (`RENDER_TIMEOUT_MS`)
    pub render_timeout: Duration,
    /// Explicit Chromium binary (`CHROME_EXECUTABLE`)
    pub chrome_executable: Option<PathBuf>,
    /// Override for the site's search URL pattern (`SEARCH_URL_PATTERN`)
    pub search_url_pattern: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories_file: PathBuf::from("categories.json"),
            output_file: PathBuf::from("complete_data.json"),
            pages_to_scrape: DEFAULT_PAGES_TO_SCRAPE,
            settle_delay: Duration::from_secs(2),
            page_delay: Duration::from_secs(2),
            render_timeout: Duration::from_secs(10),
            chrome_executable: None,
            search_url_pattern: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for unset keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            categories_file: get("CATEGORIES_FILE").map_or(defaults.categories_file, PathBuf::from),
            output_file: get("OUTPUT_FILE").map_or(defaults.output_file, PathBuf::from),
            pages_to_scrape: parse_or("PAGES_TO_SCRAPE", get("PAGES_TO_SCRAPE"), defaults.pages_to_scrape)?,
            settle_delay: millis_or("SETTLE_DELAY_MS", get("SETTLE_DELAY_MS"), defaults.settle_delay)?,
            page_delay: millis_or("PAGE_DELAY_MS", get("PAGE_DELAY_MS"), defaults.page_delay)?,
            render_timeout: millis_or("RENDER_TIMEOUT_MS", get("RENDER_TIMEOUT_MS"), defaults.render_timeout)?,
            chrome_executable: get("CHROME_EXECUTABLE").map(PathBuf::from),
            search_url_pattern: get("SEARCH_URL_PATTERN"),
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

fn millis_or(key: &str, value: Option<String>, default: Duration) -> Result<Duration> {
    let millis = parse_or(key, value, u64::try_from(default.as_millis()).unwrap_or(u64::MAX))?;
    Ok(Duration::from_millis(millis))
}
