//! Login flow - capability layer.
//!
//! Drives the tracker's login form to completion on the primary page. The
//! selectors below are the wire contract with the external application; its
//! DOM is unversioned, so brittleness here is inherent and accepted.
//!
//! Authentication is a one-time-per-session action. Re-running it against an
//! already-authenticated page would re-submit the login form, which the host
//! tolerates but never re-validates, so the orchestrator skips this flow
//! entirely when a session is already open.

use std::time::Duration;

use chromiumoxide::Page;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::{wait, BrowserSession};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Credentials;

const EMAIL_INPUT: &str = "input[name='email']";
const PASSWORD_INPUT: &str = "input[name='password']";
const SUBMIT_BUTTON: &str = "input[type='button'][value='Увійти']";

/// Login flow over the tracker's login form.
pub struct LoginFlow {
    login_url: String,
    type_delay: Duration,
    settle_delay: Duration,
    element_timeout: Duration,
    navigation_timeout: Duration,
    network_quiet: Duration,
}

impl LoginFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            type_delay: config.type_delay(),
            settle_delay: config.settle_delay(),
            element_timeout: config.element_timeout(),
            navigation_timeout: config.navigation_timeout(),
            network_quiet: config.network_quiet(),
        }
    }

    /// Logs in on the session's primary page and optionally navigates it to
    /// the project. Any missing selector or unfinished navigation is an
    /// `Authentication` error: fatal for the whole batch, never retried.
    pub async fn login(
        &self,
        session: &mut BrowserSession,
        credentials: &Credentials,
        project_url: Option<&str>,
    ) -> Result<Page> {
        let page = session.ensure_open().await?;

        info!("navigating to login page: {}", self.login_url);
        page.goto(self.login_url.as_str()).await?;
        wait::wait_for_network_idle(
            &page,
            &self.login_url,
            self.navigation_timeout,
            self.network_quiet,
        )
        .await
        .map_err(|e| self.auth_error("login page did not settle", e))?;

        // The form renders asynchronously after navigation; the email input
        // appearing is the readiness signal.
        let email_input = wait::wait_for_selector(&page, EMAIL_INPUT, self.element_timeout)
            .await
            .map_err(|e| self.auth_error("email input not found", e))?;

        debug!("typing email for {}", credentials.email);
        wait::type_slowly(&email_input, &credentials.email, self.type_delay).await?;

        let password_input = wait::wait_for_selector(&page, PASSWORD_INPUT, self.element_timeout)
            .await
            .map_err(|e| self.auth_error("password input not found", e))?;
        debug!("typing password");
        wait::type_slowly(&password_input, &credentials.password, self.type_delay).await?;

        info!("submitting login form");
        let submit = wait::wait_for_selector(&page, SUBMIT_BUTTON, self.element_timeout)
            .await
            .map_err(|e| self.auth_error("submit control not found", e))?;
        submit.click().await?;

        wait::wait_for_network_idle(
            &page,
            &self.login_url,
            self.navigation_timeout,
            self.network_quiet,
        )
        .await
        .map_err(|e| self.auth_error("post-submit navigation did not settle", e))?;

        // Navigation completion alone does not prove acceptance: rejected
        // credentials also settle, back on the login form. The password input
        // disappearing is the success signal.
        if page.find_element(PASSWORD_INPUT).await.is_ok() {
            return Err(AppError::Authentication {
                reason: "login form still present after submit (credentials rejected?)"
                    .to_string(),
            });
        }

        info!("✓ login complete");

        if let Some(url) = project_url {
            info!("navigating to project: {}", url);
            page.goto(url).await?;
            wait::wait_for_network_idle(&page, url, self.navigation_timeout, self.network_quiet)
                .await
                .map_err(|e| self.auth_error("project page did not settle", e))?;
            sleep(self.settle_delay).await;
        }

        Ok(page)
    }

    fn auth_error(&self, step: &str, source: AppError) -> AppError {
        AppError::Authentication {
            reason: format!("{}: {}", step, source),
        }
    }
}
