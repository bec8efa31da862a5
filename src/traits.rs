//! Traits and interfaces for site-agnostic scraping

use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;

/// Configuration for a marketplace search listing
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Display name for the website
    pub name: String,
    /// Search URL pattern with {query} placeholder
    pub search_url_pattern: String,
    /// CSS selectors for extracting data
    pub selectors: SiteSelectors,
}

/// CSS selectors for the parts of a search-results page
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    /// Self-contained result card wrapping one product (optional)
    pub result_card: Option<String>,
    /// Link element marking one search result title
    pub title_link: String,
    /// Title text element nested inside the title link
    pub title_text: String,
    /// Price container associated with a result
    pub price: String,
    /// Accessible price text nested inside the price container
    pub price_text: String,
    /// Product image associated with a result
    pub image: String,
    /// Control linking to the next results page
    pub pagination_next: String,
}

impl SiteConfig {
    /// Build the first search-results URL for a category.
    ///
    /// The category is percent-encoded verbatim and substituted for the
    /// `{query}` placeholder of the search URL pattern.
    pub fn build_search_url(&self, search_term: &str) -> Result<Url> {
        let encoded_term = urlencoding::encode(search_term);
        let raw = self.search_url_pattern.replace("{query}", &encoded_term);
        Url::parse(&raw).with_context(|| format!("Invalid search URL for '{search_term}': {raw}"))
    }
}

/// Something that can render a page and hand back its markup.
///
/// The browser session is the production implementation; tests script one
/// in memory.
#[async_trait]
pub trait PageSource: Send {
    /// Navigate to `url`, wait for it to render and return the rendered HTML
    async fn load(&mut self, url: &Url) -> Result<String>;

    /// Release the underlying resources. Calling it more than once is a no-op.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for &mut T {
    async fn load(&mut self, url: &Url) -> Result<String> {
        (**self).load(url).await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::amazon;

    #[test]
    fn test_build_search_url_escapes_category() {
        let site = amazon::site_config();
        let url = site.build_search_url("wireless mouse").unwrap();
        assert_eq!(url.as_str(), "https://www.amazon.com/s?k=wireless%20mouse");
    }

    #[test]
    fn test_build_search_url_escapes_reserved_characters() {
        let site = amazon::site_config();
        let url = site.build_search_url("r&d tools/kits").unwrap();
        assert_eq!(url.query(), Some("k=r%26d%20tools%2Fkits"));
    }

    #[test]
    fn test_build_search_url_rejects_bad_pattern() {
        let mut site = amazon::site_config();
        site.search_url_pattern = "not a url {query}".to_string();
        assert!(site.build_search_url("mouse").is_err());
    }
}
