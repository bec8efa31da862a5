//! In-memory page source for exercising the crawl loop without a browser

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use url::Url;

use crate::traits::PageSource;

/// Serves canned HTML by URL and records every load
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pages: HashMap<String, String>,
    pub loads: Vec<String>,
    pub close_calls: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn load(&mut self, url: &Url) -> Result<String> {
        self.loads.push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("net::ERR_CONNECTION_REFUSED at {url}"))
    }

    async fn close(&mut self) -> Result<()> {
        self.close_calls += 1;
        Ok(())
    }
}

/// Markup for one search result card
pub fn result_card(title: &str, price: Option<&str>, image: Option<&str>) -> String {
    let price = price
        .map(|p| format!(r#"<span class="a-price"><span class="a-offscreen">{p}</span></span>"#))
        .unwrap_or_default();
    let image = image
        .map(|src| format!(r#"<img class="s-image" src="{src}">"#))
        .unwrap_or_default();

    format!(
        r#"<div data-component-type="s-search-result">{image}
             <a class="a-link-normal s-line-clamp-2 s-link-style a-text-normal" href="/dp/item">
               <h2 class="a-size-medium a-spacing-none a-color-base a-text-normal"><span>{title}</span></h2>
             </a>{price}</div>"#
    )
}

/// A results page made of `cards`, linking to `next` when given
pub fn results_page(cards: &[String], next: Option<&str>) -> String {
    let pagination = next.map_or_else(
        || r#"<span class="s-pagination-next s-pagination-disabled">Next</span>"#.to_string(),
        |href| format!(r#"<a class="s-pagination-next" href="{href}">Next</a>"#),
    );
    format!("<html><body>{}<div>{pagination}</div></body></html>", cards.concat())
}
