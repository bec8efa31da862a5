use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod browser;
mod config;
mod crawler;
mod extractor;
mod models;
mod product_finder;
mod scrapers;
#[cfg(test)]
mod testing;
mod traits;

use browser::{BrowserSession, SessionOptions};
use config::Config;
use product_finder::ProductFinder;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let mut site = scrapers::amazon::site_config();
    if let Some(pattern) = &config.search_url_pattern {
        site.search_url_pattern.clone_from(pattern);
    }

    info!("Starting category scraper for {}", site.name);

    let options = SessionOptions {
        chrome_executable: config.chrome_executable.clone(),
        ready_selector: site.selectors.title_link.clone(),
        render_timeout: config.render_timeout,
        settle_delay: config.settle_delay,
    };

    let finder = ProductFinder::new(config, site)?;
    let output = finder
        .run(|| BrowserSession::launch(&options))
        .await
        .inspect_err(|e| error!("Scrape run failed: {:#}", e))?;

    let total: usize = output.iter().map(|(_, products)| products.len()).sum();
    info!("Finished: {} products across {} categories", total, output.len());

    Ok(())
}
