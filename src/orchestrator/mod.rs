//! Orchestration layer.
//!
//! ```text
//! app (scans batch files, resolves credentials)
//!     ↓
//! orchestrator::BatchSubmitter (one session, one batch at a time)
//!     ↓
//! workflow::TicketFlow (one bug report)
//!     ↓
//! services (login / form filling / text generation)
//!     ↓
//! infrastructure::JsExecutor + browser::BrowserSession
//! ```

pub mod batch_submitter;

pub use batch_submitter::{drive_batch, BatchSubmitter};
