//! Ticket filing flow - workflow layer.
//!
//! Runs one bug report end to end on one already-navigated page: log the
//! item, fill the form, report the outcome. Holds no resources and makes no
//! batch-level decisions; failures bubble up to the orchestrator, which
//! records them without aborting the batch.

use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::JsExecutor;
use crate::models::BugReport;
use crate::services::TicketFormFiller;
use crate::utils::logging::truncate_text;
use crate::workflow::ticket_ctx::TicketCtx;

/// Flow for filing one ticket.
pub struct TicketFlow {
    filler: TicketFormFiller,
}

impl TicketFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            filler: TicketFormFiller::new(config),
        }
    }

    pub async fn run(&self, executor: &JsExecutor, bug: &BugReport, ctx: &TicketCtx) -> Result<()> {
        info!("{} filing: {}", ctx, truncate_text(&bug.title, 80));

        match self.filler.fill(executor, bug).await {
            Ok(()) => {
                info!("{} ✓ ticket filed", ctx);
                Ok(())
            }
            Err(e) => {
                error!("{} ❌ {}", ctx, e);
                Err(e)
            }
        }
    }
}
