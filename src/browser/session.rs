//! Browser session ownership.
//!
//! One `BrowserSession` owns one long-lived browser process and every page
//! opened in it. This is the only module allowed to spawn or terminate an
//! OS-level browser process. The session is created lazily on first use,
//! reused across batches, and never silently recreated: a stale session
//! surfaces as form-fill failures, not as an automatic reconnect.

use std::sync::Mutex;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

use super::wait;

struct SessionInner {
    browser: Browser,
    handler_task: JoinHandle<()>,
    /// First page of the session, reused for the first item of every batch.
    primary: Page,
    /// Tabs opened for items 2..N, tracked so they can be closed after the batch.
    secondary: Mutex<Vec<Page>>,
}

/// Owner of the single browser process and its open pages.
pub struct BrowserSession {
    chrome_executable: Option<String>,
    navigation_timeout: Duration,
    network_quiet: Duration,
    inner: Option<SessionInner>,
}

impl BrowserSession {
    pub fn new(config: &Config) -> Self {
        Self {
            chrome_executable: config.chrome_executable.clone(),
            navigation_timeout: config.navigation_timeout(),
            network_quiet: config.network_quiet(),
            inner: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Launches the browser if needed and returns the primary page.
    ///
    /// Idempotent: an already-open session is returned as-is, without side
    /// effects.
    pub async fn ensure_open(&mut self) -> Result<Page> {
        if let Some(inner) = &self.inner {
            debug!("browser already running, reusing existing session");
            return Ok(inner.primary.clone());
        }

        info!("🚀 launching browser...");

        let mut builder = BrowserConfig::builder()
            .with_head()
            .viewport(None)
            .args(vec!["--start-maximized", "--no-first-run"]);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(AppError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Give the freshly started process a moment to register its first target.
        sleep(Duration::from_millis(300)).await;

        let pages = browser.pages().await?;
        let primary = match pages.into_iter().next() {
            Some(page) => page,
            None => browser.new_page("about:blank").await?,
        };

        debug!("browser up, primary page captured");

        let page = primary.clone();
        self.inner = Some(SessionInner {
            browser,
            handler_task,
            primary,
            secondary: Mutex::new(Vec::new()),
        });

        Ok(page)
    }

    /// The primary page of an open session.
    pub fn primary_page(&self) -> Result<Page> {
        self.inner
            .as_ref()
            .map(|inner| inner.primary.clone())
            .ok_or(AppError::SessionNotOpen)
    }

    /// Opens a new tab, navigates it to `url` and waits for network-idle.
    pub async fn open_tab(&self, url: &str) -> Result<Page> {
        let inner = self.inner.as_ref().ok_or(AppError::SessionNotOpen)?;

        debug!("opening new tab for {}", url);
        let page = inner.browser.new_page("about:blank").await?;
        page.goto(url).await?;
        wait::wait_for_network_idle(&page, url, self.navigation_timeout, self.network_quiet)
            .await?;

        inner.secondary.lock().unwrap().push(page.clone());
        Ok(page)
    }

    /// Closes every tracked non-primary tab. Close failures are logged and
    /// ignored so a dead tab cannot poison session teardown.
    pub async fn close_secondary_tabs(&self) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };

        let pages: Vec<Page> = inner.secondary.lock().unwrap().drain(..).collect();
        if pages.is_empty() {
            return;
        }

        info!("closing {} secondary tab(s)", pages.len());
        for page in pages {
            if let Err(e) = page.close().await {
                warn!("failed to close tab: {}", e);
            }
        }
    }

    /// Terminates the browser process and invalidates all page handles.
    /// No-op when no session exists.
    pub async fn close(&mut self) {
        let Some(mut inner) = self.inner.take() else {
            return;
        };

        info!("closing browser session");
        if let Err(e) = inner.browser.close().await {
            warn!("browser close failed: {}", e);
        }
        if let Err(e) = inner.browser.wait().await {
            warn!("browser did not exit cleanly: {}", e);
        }
        inner.handler_task.abort();
    }
}
