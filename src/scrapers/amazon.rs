//! Amazon.com search-results configuration

use crate::traits::{SiteConfig, SiteSelectors};

/// Search URL used when no override is configured
pub const SEARCH_URL_PATTERN: &str = "https://www.amazon.com/s?k={query}";

/// Selectors for Amazon's search-results markup.
///
/// These class names are an unversioned contract with the site; when the
/// markup changes, extraction silently returns fewer fields.
pub fn site_config() -> SiteConfig {
    SiteConfig {
        name: "Amazon".to_string(),
        search_url_pattern: SEARCH_URL_PATTERN.to_string(),
        selectors: SiteSelectors {
            result_card: Some(r#"div[data-component-type="s-search-result"]"#.to_string()),
            title_link: "a.a-link-normal.s-line-clamp-2.s-link-style.a-text-normal".to_string(),
            title_text: "h2.a-size-medium.a-spacing-none.a-color-base.a-text-normal".to_string(),
            price: "span.a-price".to_string(),
            price_text: "span.a-offscreen".to_string(),
            image: "img.s-image".to_string(),
            pagination_next: ".s-pagination-next".to_string(),
        },
    }
}
