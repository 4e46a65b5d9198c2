//! Ticket form filler - capability layer.
//!
//! Populates the title and composed description of one ticket-creation form
//! on a page that is already at a ticket-creation context. Only handles a
//! single `BugReport`; knows nothing about batches or sessions.
//!
//! The host application's reactive form binding only picks up values from
//! observed `input` events, not from direct assignment, so both fields are
//! mutated through a script that fires the event twice: once for the clear
//! and once for the set. That double fire is an interaction contract with the
//! external application, not a choice of this crate.
//!
//! No submit action is performed: ticket persistence rides on the host
//! application's own autosave.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::wait;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::infrastructure::JsExecutor;
use crate::models::BugReport;

const TITLE_INPUT: &str = "#ta_name";
const DESCRIPTION_EDITOR: &str = "#editor .data";

/// Fills the ticket-creation form for one bug report.
pub struct TicketFormFiller {
    settle_delay: Duration,
    element_timeout: Duration,
}

impl TicketFormFiller {
    pub fn new(config: &Config) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            element_timeout: config.element_timeout(),
        }
    }

    /// Fills title and description. On success the form holds exactly the
    /// title and the composed description; any selector missing beyond its
    /// timeout is a `FormNotReady` error for the orchestrator to record.
    pub async fn fill(&self, executor: &JsExecutor, bug: &BugReport) -> Result<()> {
        let page = executor.page();

        // The creation form renders after the page settles and exposes no
        // completion signal of its own, so one bounded settle remains here.
        sleep(self.settle_delay).await;
        wait::wait_for_selector(page, TITLE_INPUT, self.element_timeout)
            .await
            .map_err(|e| self.not_ready(TITLE_INPUT, e))?;

        debug!("setting ticket title");
        self.set_field_value(executor, TITLE_INPUT, &bug.title)
            .await?;

        // Focus the rich-text editor so the host app attaches its bindings.
        let editor = wait::wait_for_selector(page, DESCRIPTION_EDITOR, self.element_timeout)
            .await
            .map_err(|e| self.not_ready(DESCRIPTION_EDITOR, e))?;
        editor.click().await?;
        wait::wait_for_selector(page, DESCRIPTION_EDITOR, self.element_timeout)
            .await
            .map_err(|e| self.not_ready(DESCRIPTION_EDITOR, e))?;

        let description = bug.compose_description();
        sleep(self.settle_delay).await;

        debug!("setting ticket description ({} chars)", description.len());
        self.set_editor_text(executor, DESCRIPTION_EDITOR, &description)
            .await?;

        info!("✓ form filled: {}", bug.title);
        Ok(())
    }

    /// Clears and sets an `<input>` value, firing `input` for each mutation.
    async fn set_field_value(
        &self,
        executor: &JsExecutor,
        selector: &str,
        value: &str,
    ) -> Result<()> {
        let js_code = format!(
            r#"
            (() => {{
                const input = document.querySelector({selector});
                if (!input) {{ return false; }}
                input.value = '';
                input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                input.value = {value};
                input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            value = serde_json::to_string(value)?,
        );

        self.run_mutation(executor, selector, js_code).await
    }

    /// Clears and sets a contenteditable region's text, firing `input` for
    /// each mutation.
    async fn set_editor_text(
        &self,
        executor: &JsExecutor,
        selector: &str,
        text: &str,
    ) -> Result<()> {
        let js_code = format!(
            r#"
            (() => {{
                const editor = document.querySelector({selector});
                if (!editor) {{ return false; }}
                editor.innerText = '';
                editor.dispatchEvent(new Event('input', {{ bubbles: true }}));
                editor.innerText = {text};
                editor.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            text = serde_json::to_string(text)?,
        );

        self.run_mutation(executor, selector, js_code).await
    }

    /// The mutation scripts return `false` when the element vanished between
    /// the wait and the write; that still counts as the form not being ready.
    async fn run_mutation(
        &self,
        executor: &JsExecutor,
        selector: &str,
        js_code: String,
    ) -> Result<()> {
        let applied: bool = executor.eval_as(js_code).await?;
        if applied {
            Ok(())
        } else {
            Err(AppError::FormNotReady {
                selector: selector.to_string(),
                timeout: self.element_timeout,
            })
        }
    }

    fn not_ready(&self, selector: &str, source: AppError) -> AppError {
        match source {
            AppError::ElementTimeout { timeout, .. } => AppError::FormNotReady {
                selector: selector.to_string(),
                timeout,
            },
            other => other,
        }
    }
}
