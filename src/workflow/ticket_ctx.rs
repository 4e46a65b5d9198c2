//! Ticket processing context.
//!
//! Captures "which item of which batch is being driven" for logging and for
//! the failure record.

use std::fmt::Display;

/// Context for one batch item.
#[derive(Debug, Clone)]
pub struct TicketCtx {
    /// Position in the batch, 1-based.
    pub index: usize,
    /// Batch size.
    pub total: usize,
    /// Title of the bug report being filed.
    pub title: String,
}

impl TicketCtx {
    pub fn new(index: usize, total: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            total,
            title: title.into(),
        }
    }
}

impl Display for TicketCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[bug {}/{}]", self.index, self.total)
    }
}
