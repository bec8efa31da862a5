//! Product and pagination extraction from rendered search-results markup
//!
//! Each field has its own locator function operating on a parsed document,
//! so the matching strategy for one field can change without touching the
//! crawl loop. Nothing here fails at extraction time: a field that cannot be
//! located becomes a placeholder, and a result without a title is dropped.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::{IMAGE_NOT_AVAILABLE, PRICE_NOT_AVAILABLE, Product};
use crate::traits::SiteSelectors;

/// Parsed form of [`SiteSelectors`]
#[derive(Debug, Clone)]
pub struct Locators {
    result_card: Option<Selector>,
    title_link: Selector,
    title_text: Selector,
    price: Selector,
    price_text: Selector,
    image: Selector,
    pagination_next: Selector,
}

impl Locators {
    /// Parse every selector once, naming the one that fails
    pub fn compile(selectors: &SiteSelectors) -> Result<Self> {
        Ok(Self {
            result_card: selectors
                .result_card
                .as_deref()
                .map(|css| parse_selector("result card", css))
                .transpose()?,
            title_link: parse_selector("title link", &selectors.title_link)?,
            title_text: parse_selector("title text", &selectors.title_text)?,
            price: parse_selector("price", &selectors.price)?,
            price_text: parse_selector("price text", &selectors.price_text)?,
            image: parse_selector("image", &selectors.image)?,
            pagination_next: parse_selector("pagination next", &selectors.pagination_next)?,
        })
    }
}

fn parse_selector(name: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Failed to parse {name} selector `{css}`: {e:?}"))
}

/// Everything the crawler needs from one results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub products: Vec<Product>,
    pub next_page: Option<Url>,
}

/// Parse `html` served from `page_url` and pull out its products and next page
pub fn extract_page(html: &str, page_url: &Url, locators: &Locators) -> PageExtraction {
    let document = Html::parse_document(html);

    PageExtraction {
        products: extract_products(&document, locators),
        next_page: locate_next_page(&document, page_url, locators),
    }
}

/// All titled results on the page, in document order
pub fn extract_products(document: &Html, locators: &Locators) -> Vec<Product> {
    document
        .select(&locators.title_link)
        .filter_map(|link| {
            let title = locate_title(link, locators)?;
            let anchor = Anchor::for_title(link, locators);

            Some(Product {
                title,
                price: locate_price(anchor, locators),
                image_url: locate_image(anchor, locators),
            })
        })
        .collect()
}

/// Where to look for the fields belonging to one title link
#[derive(Debug, Clone, Copy)]
pub enum Anchor<'a> {
    /// Search inside the result card enclosing the title
    Card(ElementRef<'a>),
    /// No enclosing card: take the nearest match after the title in document order
    Following(ElementRef<'a>),
}

impl<'a> Anchor<'a> {
    pub fn for_title(link: ElementRef<'a>, locators: &Locators) -> Self {
        locators
            .result_card
            .as_ref()
            .and_then(|card| enclosing(link, card))
            .map_or(Anchor::Following(link), Anchor::Card)
    }

    fn find(self, selector: &Selector) -> Option<ElementRef<'a>> {
        match self {
            Anchor::Card(card) => card.select(selector).next(),
            Anchor::Following(start) => following_elements(start).find(|el| selector.matches(el)),
        }
    }
}

fn enclosing<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| selector.matches(ancestor))
}

/// Elements after `start` in document order, starting with its own descendants
fn following_elements<'a>(start: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    let node = *start;
    let inside = node.descendants().skip(1);
    let after = std::iter::once(node)
        .chain(node.ancestors())
        .flat_map(|n| n.next_siblings())
        .flat_map(|sibling| sibling.descendants());

    inside.chain(after).filter_map(ElementRef::wrap)
}

/// Whitespace-normalized text of an element
fn text_of(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The title nested in a result link; `None` when missing or blank
pub fn locate_title(link: ElementRef, locators: &Locators) -> Option<String> {
    link.select(&locators.title_text)
        .next()
        .map(text_of)
        .filter(|title| !title.is_empty())
}

/// The accessible price text for a result, or the placeholder
pub fn locate_price(anchor: Anchor, locators: &Locators) -> String {
    anchor
        .find(&locators.price)
        .and_then(|price| price.select(&locators.price_text).next())
        .map(text_of)
        .filter(|price| !price.is_empty())
        .unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string())
}

/// The image source attribute for a result as written, or the placeholder
/// when the element or a non-blank `src` is missing
pub fn locate_image(anchor: Anchor, locators: &Locators) -> String {
    anchor
        .find(&locators.image)
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map_or_else(|| IMAGE_NOT_AVAILABLE.to_string(), str::to_string)
}

/// The absolute address of the next results page, if the page links one.
///
/// The link is resolved against the URL that served this page. Fragments are
/// dropped, so an in-page link such as `#` resolves to the page itself.
pub fn locate_next_page(document: &Html, page_url: &Url, locators: &Locators) -> Option<Url> {
    let Some(control) = document.select(&locators.pagination_next).next() else {
        debug!("No pagination-next control on {}", page_url);
        return None;
    };
    let Some(href) = control.value().attr("href") else {
        debug!("Pagination-next control on {} has no link (last page)", page_url);
        return None;
    };

    match page_url.join(href) {
        Ok(mut next) => {
            next.set_fragment(None);
            Some(next)
        }
        Err(e) => {
            debug!("Could not resolve next page link `{}` on {}: {}", href, page_url, e);
            None
        }
    }
}
