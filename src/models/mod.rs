//! Data models for scraped product listings and the aggregated run output

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder used when a listing shows no price
pub const PRICE_NOT_AVAILABLE: &str = "Price Not Available";

/// Placeholder used when a listing shows no image
pub const IMAGE_NOT_AVAILABLE: &str = "Image Not Available";

/// A single product listing scraped from a search-results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: String,
    pub image_url: String,
}

/// Products collected for every category of a run, keyed by category name.
///
/// Keys keep the order in which categories were first inserted, so the
/// written JSON object lists categories in crawl order. Inserting a category
/// that is already present replaces its products in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    categories: Vec<(String, Vec<Product>)>,
}

impl RunOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: String, products: Vec<Product>) {
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, slot)) => *slot = products,
            None => self.categories.push((category, products)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, category: &str) -> Option<&[Product]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, products)| products.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Product])> {
        self.categories
            .iter()
            .map(|(name, products)| (name.as_str(), products.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

impl Serialize for RunOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, products) in &self.categories {
            map.serialize_entry(category, products)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RunOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RunOutputVisitor)
    }
}

struct RunOutputVisitor;

impl<'de> Visitor<'de> for RunOutputVisitor {
    type Value = RunOutput;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of category names to product lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut output = RunOutput::new();
        while let Some((category, products)) = access.next_entry::<String, Vec<Product>>()? {
            output.insert(category, products);
        }
        Ok(output)
    }
}
