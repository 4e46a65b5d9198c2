//! # Bug Report Submit
//!
//! Batch-files bug reports into the Worksection tracker by driving a real
//! browser session through its UI.
//!
//! ## Architecture
//!
//! The crate keeps a strict layering:
//!
//! ### ① Infrastructure
//! - `browser/` - owns the one browser process and every page opened in it
//! - `infrastructure/` - `JsExecutor`, the only JS-eval capability over a page
//!
//! ### ② Capabilities (services)
//! - `LoginFlow` - drives the tracker's login form once per session
//! - `TicketFormFiller` - fills one ticket-creation form for one report
//! - `LlmService` / `report_parser` - free text → structured `BugReport`
//!
//! ### ③ Workflow
//! - `TicketCtx` - which item of which batch is being driven
//! - `TicketFlow` - one bug report end to end on one page
//!
//! ### ④ Orchestration
//! - `BatchSubmitter` - one session, one batch at a time, per-item failure
//!   isolation, aggregate `SubmissionResult`
//!
//! Supporting modules: `models` (reports, batch files, results), `storage`
//! (per-user credentials and projects), `config`, `error`, `app`.

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

pub use browser::BrowserSession;
pub use config::Config;
pub use error::{AppError, ErrorKind, Result};
pub use infrastructure::JsExecutor;
pub use models::{BugReport, Credentials, SubmissionFailure, SubmissionResult};
pub use orchestrator::{drive_batch, BatchSubmitter};
pub use services::{LlmService, LoginFlow, TicketFormFiller};
pub use workflow::{TicketCtx, TicketFlow};
