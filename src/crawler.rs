//! Bounded pagination loop over one category's search results

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::extractor::{Locators, PageExtraction, extract_page};
use crate::models::Product;
use crate::traits::{PageSource, SiteConfig};

/// Walks a category's result pages, collecting products in page order
pub struct CategoryCrawler<'a> {
    site: &'a SiteConfig,
    locators: &'a Locators,
    page_delay: Duration,
}

impl<'a> CategoryCrawler<'a> {
    pub fn new(site: &'a SiteConfig, locators: &'a Locators, page_delay: Duration) -> Self {
        Self {
            site,
            locators,
            page_delay,
        }
    }

    /// Scrape up to `pages_to_scrape` pages for `category`.
    ///
    /// Stops early when a page has no next-page link or links back to itself.
    /// A failed page load aborts the category and is returned as an error.
    pub async fn crawl<P>(&self, source: &mut P, category: &str, pages_to_scrape: u32) -> Result<Vec<Product>>
    where
        P: PageSource + ?Sized,
    {
        let mut current_url = self.site.build_search_url(category)?;
        let mut products = Vec::new();

        for page_num in 1..=pages_to_scrape {
            info!("Scraping page {} for category '{}' on {}", page_num, category, self.site.name);

            let html = source
                .load(&current_url)
                .await
                .with_context(|| format!("Failed to load page {page_num} for category '{category}'"))?;

            // The parsed document is not Send; keep it out of any await
            let PageExtraction { products: found, next_page } =
                extract_page(&html, &current_url, self.locators);

            info!("Found {} products on page {} for '{}'", found.len(), page_num, category);
            products.extend(found);

            match next_page {
                Some(next_url) if next_url == current_url => {
                    info!("Next page URL is the same as current URL, stopping pagination for '{}'", category);
                    break;
                }
                Some(next_url) => current_url = next_url,
                None => {
                    info!(
                        "Reached the last page or could not find next page for category '{}' (searched {} pages)",
                        category, page_num
                    );
                    break;
                }
            }

            if page_num < pages_to_scrape {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        info!("Collected {} products for category '{}'", products.len(), category);
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IMAGE_NOT_AVAILABLE, PRICE_NOT_AVAILABLE};
    use crate::scrapers::amazon;
    use crate::testing::{ScriptedSource, result_card, results_page};

    const FIRST_PAGE: &str = "https://www.amazon.com/s?k=wireless%20mouse";

    fn fixtures() -> (SiteConfig, Locators) {
        let site = amazon::site_config();
        let locators = Locators::compile(&site.selectors).unwrap();
        (site, locators)
    }

    #[tokio::test]
    async fn test_follows_pagination_until_last_page() {
        let (site, locators) = fixtures();
        let crawler = CategoryCrawler::new(&site, &locators, Duration::ZERO);

        let mut source = ScriptedSource::new()
            .with_page(
                FIRST_PAGE,
                results_page(
                    &[result_card("Mouse A", Some("$10.00"), Some("https://img.example/a.jpg"))],
                    Some("/s?k=wireless+mouse&amp;page=2"),
                ),
            )
            .with_page(
                "https://www.amazon.com/s?k=wireless+mouse&page=2",
                results_page(&[result_card("Mouse B", None, None)], None),
            );

        let products = crawler.crawl(&mut source, "wireless mouse", 20).await.unwrap();

        assert_eq!(source.loads.len(), 2);
        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Mouse A", "Mouse B"]);
        assert_eq!(products[1].price, PRICE_NOT_AVAILABLE);
        assert_eq!(products[1].image_url, IMAGE_NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_never_exceeds_page_bound() {
        let (site, locators) = fixtures();
        let crawler = CategoryCrawler::new(&site, &locators, Duration::ZERO);

        // Four linked pages, more than the bound allows
        let page = |n: u32| format!("https://www.amazon.com/s?k=wireless+mouse&page={n}");
        let link = |n: u32| format!("/s?k=wireless+mouse&amp;page={n}");
        let mut source = ScriptedSource::new().with_page(
            FIRST_PAGE,
            results_page(&[result_card("Mouse 1", None, None)], Some(&link(2))),
        );
        for n in 2..=4 {
            source = source.with_page(
                &page(n),
                results_page(&[result_card(&format!("Mouse {n}"), None, None)], Some(&link(n + 1))),
            );
        }

        let products = crawler.crawl(&mut source, "wireless mouse", 3).await.unwrap();

        assert_eq!(source.loads.len(), 3);
        assert_eq!(products.len(), 3);
    }

    #[tokio::test]
    async fn test_stops_when_next_page_links_to_itself() {
        let (site, locators) = fixtures();
        let crawler = CategoryCrawler::new(&site, &locators, Duration::ZERO);

        let mut source = ScriptedSource::new().with_page(
            FIRST_PAGE,
            results_page(&[result_card("Loop", None, None)], Some(FIRST_PAGE)),
        );

        let products = crawler.crawl(&mut source, "wireless mouse", 20).await.unwrap();
        assert_eq!(source.loads.len(), 1);
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_stops_when_next_page_is_an_in_page_anchor() {
        let (site, locators) = fixtures();
        let crawler = CategoryCrawler::new(&site, &locators, Duration::ZERO);

        let mut source = ScriptedSource::new().with_page(
            FIRST_PAGE,
            results_page(&[result_card("Anchor", None, None)], Some("#")),
        );

        let products = crawler.crawl(&mut source, "wireless mouse", 20).await.unwrap();
        assert_eq!(source.loads.len(), 1);
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_page_bound_loads_nothing() {
        let (site, locators) = fixtures();
        let crawler = CategoryCrawler::new(&site, &locators, Duration::ZERO);
        let mut source = ScriptedSource::new();

        let products = crawler.crawl(&mut source, "wireless mouse", 0).await.unwrap();
        assert!(products.is_empty());
        assert!(source.loads.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_is_an_error() {
        let (site, locators) = fixtures();
        let crawler = CategoryCrawler::new(&site, &locators, Duration::ZERO);
        let mut source = ScriptedSource::new();

        let err = crawler.crawl(&mut source, "wireless mouse", 5).await.unwrap_err();
        assert!(err.to_string().contains("page 1"));
        assert_eq!(source.loads, [FIRST_PAGE]);
    }
}
