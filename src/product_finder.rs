use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::config::Config;
use crate::crawler::CategoryCrawler;
use crate::extractor::Locators;
use crate::models::RunOutput;
use crate::traits::{PageSource, SiteConfig};

/// Runs every configured category through one shared page source
pub struct ProductFinder {
    config: Config,
    site: SiteConfig,
    locators: Locators,
}

impl ProductFinder {
    pub fn new(config: Config, site: SiteConfig) -> Result<Self> {
        let locators = Locators::compile(&site.selectors)
            .with_context(|| format!("Invalid selectors for {}", site.name))?;

        Ok(Self {
            config,
            site,
            locators,
        })
    }

    /// Scrape every category and write the results file.
    ///
    /// The category list is read before the session is opened, and the
    /// session is closed on every path once it exists. Nothing is written
    /// unless every category was crawled.
    pub async fn run<P, E, F, Fut>(&self, open_session: F) -> Result<RunOutput>
    where
        P: PageSource,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<P, E>>,
    {
        let categories = load_categories(&self.config.categories_file)?;
        info!("Loaded {} categories from {}", categories.len(), self.config.categories_file.display());

        let mut session = open_session().await.context("Failed to start browser session")?;

        let outcome = self.scrape_categories(&mut session, &categories).await;
        if let Err(e) = session.close().await {
            warn!("Error while closing browser session: {:#}", e);
        }
        let output = outcome?;

        write_output(&self.config.output_file, &output)?;
        info!("Saved data for all categories to '{}'", self.config.output_file.display());

        Ok(output)
    }

    async fn scrape_categories<P: PageSource>(&self, session: &mut P, categories: &[String]) -> Result<RunOutput> {
        let crawler = CategoryCrawler::new(&self.site, &self.locators, self.config.page_delay);
        let mut output = RunOutput::new();

        for category in categories {
            info!("Scraping data for category: {}", category);
            let products = crawler
                .crawl(session, category, self.config.pages_to_scrape)
                .await?;
            output.insert(category.clone(), products);
        }

        Ok(output)
    }
}

/// Read the JSON array of category names
pub fn load_categories(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read categories file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Categories file {} is not a JSON array of strings", path.display()))
}

/// Write the run output as JSON indented by four spaces
pub fn write_output(path: &Path, output: &RunOutput) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    output
        .serialize(&mut serializer)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}
