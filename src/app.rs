//! Application entry logic.
//!
//! Scans the pending-report folder, expands free-text entries through the
//! text-generation chain, resolves each batch's credentials and project, and
//! feeds the batches one after another through a single shared browser
//! session. Batch files that submitted cleanly are deleted; files with
//! failures stay behind so the failed items can be resubmitted.

use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{BatchFile, BugEntry, BugReport, Credentials};
use crate::orchestrator::BatchSubmitter;
use crate::services::LlmService;
use crate::storage::UserStore;

/// Application main structure.
pub struct App {
    config: Config,
    store: UserStore,
    llm: LlmService,
    submitter: BatchSubmitter,
}

/// Totals across all processed batch files.
#[derive(Debug, Default)]
struct RunStats {
    batches: usize,
    created: usize,
    failed: usize,
}

impl App {
    pub async fn initialize(config: Config) -> Result<Self> {
        let store = UserStore::new(&config.storage_dir, config.credential_max_age_days);
        store.init().await?;

        Ok(Self {
            llm: LlmService::new(&config),
            submitter: BatchSubmitter::new(&config),
            store,
            config,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        log_startup(&self.config);

        let batches = crate::models::load_all_batch_files(&self.config.report_folder).await?;
        if batches.is_empty() {
            warn!("⚠️ no pending batch files, nothing to do");
            return Ok(());
        }
        info!("✓ found {} batch file(s)", batches.len());

        let mut stats = RunStats::default();
        for batch in batches {
            match self.process_batch_file(&batch).await {
                Ok((created, failed)) => {
                    stats.batches += 1;
                    stats.created += created;
                    stats.failed += failed;
                }
                Err(e) => {
                    error!(
                        "batch {} failed: {}",
                        batch
                            .file_path
                            .as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default(),
                        e
                    );
                    stats.failed += batch.bugs.len();
                }
            }
        }

        self.submitter.close().await;
        log_final_stats(&stats);
        Ok(())
    }

    /// Processes one batch file end to end. Returns (created, failed).
    async fn process_batch_file(&mut self, batch: &BatchFile) -> Result<(usize, usize)> {
        let user_id = batch.user.as_deref().unwrap_or("default");

        let bugs = self.expand_entries(&batch.bugs).await;
        if bugs.is_empty() {
            warn!("⚠️ batch has no usable bug reports, skipping");
            return Ok((0, 0));
        }

        let credentials = self.resolve_credentials(user_id).await?;
        let project_url = self.resolve_project_url(batch, user_id).await?;

        let result = self
            .submitter
            .submit_batch(&credentials, &project_url, &bugs)
            .await?;

        if result.is_clean() {
            if let Some(path) = batch.file_path.as_deref() {
                info!("🗑️ removing processed file: {}", path.display());
                if let Err(e) = fs::remove_file(path).await {
                    warn!("could not remove {}: {}", path.display(), e);
                }
            }
        } else {
            warn!(
                "keeping batch file, {} item(s) need resubmission",
                result.failures.len()
            );
        }

        Ok((result.created, result.failures.len()))
    }

    /// Structured entries pass through; free-text entries go through the
    /// provider chain. An entry that cannot be expanded is skipped with a
    /// warning instead of sinking the whole batch.
    async fn expand_entries(&self, entries: &[BugEntry]) -> Vec<BugReport> {
        let mut bugs = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                BugEntry::Structured(bug) => bugs.push(bug.clone()),
                BugEntry::FreeText { text } => {
                    info!("expanding free-text bug description...");
                    match self.llm.expand_bug_description(text).await {
                        Ok(bug) => bugs.push(bug),
                        Err(e) => warn!("⚠️ could not expand entry, skipping: {}", e),
                    }
                }
            }
        }
        bugs
    }

    /// Environment variables override the store; stored credentials must be
    /// within their expiration age.
    async fn resolve_credentials(&self, user_id: &str) -> Result<Credentials> {
        if let (Ok(email), Ok(password)) = (
            std::env::var("WORKSECTION_EMAIL"),
            std::env::var("WORKSECTION_PASSWORD"),
        ) {
            return Ok(Credentials { email, password });
        }

        let stored = self
            .store
            .get_credentials(user_id)
            .await?
            .ok_or_else(|| {
                AppError::Config(format!("no stored credentials for user {}", user_id))
            })?;

        if self.store.is_expired(stored.saved_at) {
            self.store.clear_credentials(user_id).await?;
            return Err(AppError::Config(format!(
                "credentials for user {} expired, please log in again",
                user_id
            )));
        }

        Ok(Credentials {
            email: stored.email,
            password: stored.password,
        })
    }

    async fn resolve_project_url(&self, batch: &BatchFile, user_id: &str) -> Result<String> {
        if let Some(url) = &batch.project_url {
            return Ok(url.clone());
        }
        self.store
            .selected_project(user_id)
            .await?
            .map(|project| project.url)
            .ok_or_else(|| {
                AppError::Config(format!("no project selected for user {}", user_id))
            })
    }
}

// ========== log helpers ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 bug report submitter starting");
    info!("📁 report folder: {}", config.report_folder);
    info!("{}", "=".repeat(60));
}

fn log_final_stats(stats: &RunStats) {
    info!("{}", "=".repeat(60));
    info!("📊 run complete: {} batch file(s) processed", stats.batches);
    info!("✅ tickets created: {}", stats.created);
    info!("❌ failed items: {}", stats.failed);
    info!("{}", "=".repeat(60));
}
