//! Condition-based waits over a page.
//!
//! The host application renders its forms asynchronously, so every wait here
//! polls a concrete readiness signal under a bounded deadline instead of
//! sleeping for a fixed interval. Each wait is a single attempt; there are no
//! retries on top.

use std::time::Duration;

use chromiumoxide::{Element, Page};
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::error::{AppError, Result};

/// Poll interval for element and readiness checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Waits until `selector` exists on the page.
///
/// Callers map the timeout error to their own kind (`Authentication` for the
/// login flow, `FormNotReady` for the form filler).
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }
        if Instant::now() + POLL_INTERVAL >= deadline {
            return Err(AppError::ElementTimeout {
                selector: selector.to_string(),
                timeout,
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Waits for the current navigation to reach network-idle.
///
/// Heuristic: the navigation lifecycle completes, `document.readyState` is
/// `"complete"`, and the resource-entry count stays stable for one quiet
/// window. There is no exact in-flight-request signal over CDP without a full
/// network event subscription, so a stable resource count over the quiet
/// window stands in for "no more than a few in-flight requests".
pub async fn wait_for_network_idle(
    page: &Page,
    url: &str,
    nav_timeout: Duration,
    quiet_window: Duration,
) -> Result<()> {
    let deadline = Instant::now() + nav_timeout;

    timeout(nav_timeout, page.wait_for_navigation())
        .await
        .map_err(|_| AppError::Navigation {
            url: url.to_string(),
            timeout: nav_timeout,
        })?
        .map_err(AppError::Cdp)?;

    let mut last_count: i64 = -1;
    loop {
        let ready: String = page
            .evaluate("document.readyState")
            .await?
            .into_value()
            .unwrap_or_default();
        let count: i64 = page
            .evaluate("performance.getEntriesByType('resource').length")
            .await?
            .into_value()
            .unwrap_or(0);

        if ready == "complete" && count == last_count {
            debug!("network idle at {} ({} resource entries)", url, count);
            return Ok(());
        }
        last_count = count;

        if Instant::now() + quiet_window >= deadline {
            return Err(AppError::Navigation {
                url: url.to_string(),
                timeout: nav_timeout,
            });
        }
        sleep(quiet_window).await;
    }
}

/// Types text one character at a time with an inter-keystroke delay.
///
/// Some login forms reject instantaneous programmatic fills, so keystrokes
/// are paced like human input.
pub async fn type_slowly(element: &Element, text: &str, delay: Duration) -> Result<()> {
    element.click().await?;
    for ch in text.chars() {
        element.type_str(ch.to_string()).await?;
        sleep(delay).await;
    }
    Ok(())
}
