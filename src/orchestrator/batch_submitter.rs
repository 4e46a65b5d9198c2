//! Batch submitter - orchestration layer.
//!
//! ## Responsibilities
//!
//! 1. **Session management**: lazily opens the one browser session and reuses
//!    it across batches; authentication runs at most once per session.
//! 2. **Sequencing**: item 1 on the primary page, items 2..N each on a fresh
//!    tab, strictly in input order, one at a time. Tabs are never driven
//!    concurrently: the host application keeps shared client-side state that
//!    concurrent writes would corrupt.
//! 3. **Failure isolation**: an item's error is recorded and the batch keeps
//!    going; only authentication errors abort the whole call.
//! 4. **Cleanup**: secondary tabs are closed after the batch unless the
//!    caller wants them kept for inspection.
//!
//! One submitter must not be driven from two tasks at once; there is no
//! internal locking. That is a caller invariant, same as the single shared
//! browser process it guards.

use std::future::Future;

use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::JsExecutor;
use crate::models::{BugReport, Credentials, SubmissionResult};
use crate::services::LoginFlow;
use crate::workflow::{TicketCtx, TicketFlow};

/// Batch submission orchestrator. Owns the session for the process lifetime.
pub struct BatchSubmitter {
    keep_tabs_open: bool,
    session: BrowserSession,
    login_flow: LoginFlow,
    ticket_flow: TicketFlow,
}

impl BatchSubmitter {
    pub fn new(config: &Config) -> Self {
        Self {
            keep_tabs_open: config.keep_tabs_open,
            session: BrowserSession::new(config),
            login_flow: LoginFlow::new(config),
            ticket_flow: TicketFlow::new(config),
        }
    }

    pub fn is_session_open(&self) -> bool {
        self.session.is_open()
    }

    /// Files every bug report of the batch into the project.
    ///
    /// Fails only on authentication (fatal, nothing attempted); per-item
    /// errors end up in the returned result instead.
    pub async fn submit_batch(
        &mut self,
        credentials: &Credentials,
        project_url: &str,
        bugs: &[BugReport],
    ) -> Result<SubmissionResult> {
        if bugs.is_empty() {
            warn!("⚠️ no bug reports in batch, nothing to do");
            return Ok(SubmissionResult::default());
        }

        log_batch_start(bugs.len(), project_url);

        // Authentication happens once per session lifetime. A stale session
        // is reused as-is and surfaces as form-fill failures, never as a
        // silent re-login mid-batch.
        let primary = if self.session.is_open() {
            info!("session already open, reusing primary page");
            let page = self.session.primary_page()?;
            page.bring_to_front().await?;
            page
        } else {
            self.login_flow
                .login(&mut self.session, credentials, Some(project_url))
                .await?
        };

        let total = bugs.len();
        let session = &self.session;
        let ticket_flow = &self.ticket_flow;

        let result = drive_batch(bugs, |index, bug| {
            let primary = primary.clone();
            async move {
                // First item rides the primary page; the rest each get a
                // fresh tab already settled on the project.
                let page = if index == 1 {
                    primary
                } else {
                    session.open_tab(project_url).await?
                };
                let executor = JsExecutor::new(page);
                let ctx = TicketCtx::new(index, total, bug.title.as_str());
                ticket_flow.run(&executor, bug, &ctx).await
            }
        })
        .await;

        if !self.keep_tabs_open {
            self.session.close_secondary_tabs().await;
        }

        log_batch_complete(&result);
        Ok(result)
    }

    /// Tears down the browser session. Safe to call when nothing is open.
    pub async fn close(&mut self) {
        self.session.close().await;
    }
}

/// Drives batch items strictly in order, isolating per-item failures.
///
/// `run_item` receives the 1-based index and the report; an error is recorded
/// against that index and the remaining items are still attempted. Factored
/// out of `submit_batch` so the sequencing and isolation rules can be
/// exercised without a browser.
pub async fn drive_batch<'a, F, Fut>(bugs: &'a [BugReport], mut run_item: F) -> SubmissionResult
where
    F: FnMut(usize, &'a BugReport) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut result = SubmissionResult::default();

    for (i, bug) in bugs.iter().enumerate() {
        let index = i + 1;
        match run_item(index, bug).await {
            Ok(()) => result.record_success(),
            Err(e) => {
                error!("bug {} ({}) failed: {}", index, bug.title, e);
                result.record_failure(index, bug.title.as_str(), e.kind());
            }
        }
    }

    result
}

// ========== log helpers ==========

fn log_batch_start(total: usize, project_url: &str) {
    info!("{}", "=".repeat(60));
    info!("📦 submitting batch of {} bug report(s)", total);
    info!("project: {}", project_url);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(result: &SubmissionResult) {
    info!("{}", "─".repeat(60));
    info!(
        "✅ batch complete: {}/{} created",
        result.created,
        result.attempted()
    );
    for failure in &result.failures {
        warn!(
            "❌ item {} ({}): {}",
            failure.index, failure.title, failure.kind
        );
    }
    info!("{}", "─".repeat(60));
}
