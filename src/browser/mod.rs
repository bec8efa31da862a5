//! Headless Chromium session driven over the DevTools protocol

mod error;

pub use error::SessionError;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::traits::PageSource;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How the browser is started and how long a page gets to render
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Explicit Chromium binary; auto-detected when `None`
    pub chrome_executable: Option<PathBuf>,
    /// Selector whose presence means results have rendered
    pub ready_selector: String,
    /// Upper bound on waiting for `ready_selector`
    pub render_timeout: Duration,
    /// Fixed pause after the page is ready, for late client-side rendering
    pub settle_delay: Duration,
}

impl SessionOptions {
    /// Extra Chromium flags for running inside restricted containers
    fn browser_args() -> Vec<&'static str> {
        vec!["--disable-dev-shm-usage", "--disable-gpu", "--no-first-run"]
    }
}

/// One headless browser with a single tab, used for every page of a run
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    options: SessionOptions,
    closed: bool,
}

impl BrowserSession {
    /// Launch Chromium headless and without the OS sandbox.
    ///
    /// Failure here is fatal for the run and is not retried.
    pub async fn launch(options: &SessionOptions) -> Result<Self, SessionError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .args(SessionOptions::browser_args());
        if let Some(path) = &options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(SessionError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        // The handler must be polled for any page command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(SessionError::Launch(format!("could not open a tab: {e}")));
            }
        };

        info!("Headless browser session started");
        Ok(Self {
            browser,
            page,
            handler_task,
            options: options.clone(),
            closed: false,
        })
    }
}

/// Poll for the ready selector until it appears or the render timeout passes
async fn wait_until_rendered(page: &Page, options: &SessionOptions, url: &Url) -> bool {
    let started = Instant::now();
    loop {
        if page.find_element(options.ready_selector.as_str()).await.is_ok() {
            return true;
        }
        if started.elapsed() >= options.render_timeout {
            return false;
        }
        debug!("Waiting for results to render on {}", url);
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

#[async_trait]
impl PageSource for BrowserSession {
    async fn load(&mut self, url: &Url) -> Result<String> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| SessionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !wait_until_rendered(&self.page, &self.options, url).await {
            warn!(
                "No results rendered on {} within {:?}; extracting what is there",
                url, self.options.render_timeout
            );
        }
        tokio::time::sleep(self.options.settle_delay).await;

        let html = self.page.content().await.map_err(SessionError::from)?;
        Ok(html)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self.browser.close().await.map_err(SessionError::from);
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        info!("Browser session closed");

        closed?;
        Ok(())
    }
}
