//! Application error types.
//!
//! The browser-driving core distinguishes three externally meaningful error
//! kinds: navigation that never settles, a login that cannot complete, and a
//! ticket form that never becomes ready. Authentication errors abort a whole
//! batch; form errors are caught per item and recorded in the submission
//! result. There are no retries anywhere in the core: every wait is a single
//! bounded attempt.

use std::time::Duration;

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// An operation that needs a live browser session was called before
    /// `ensure_open` (or after `close`).
    #[error("browser session is not open")]
    SessionNotOpen,

    /// Launching the browser process failed.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// Navigation did not reach network-idle within its bounded timeout.
    #[error("navigation to {url} did not settle within {timeout:?}")]
    Navigation { url: String, timeout: Duration },

    /// The login flow could not complete. Fatal for the whole batch.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// The ticket form did not become interactable in time. Caught per item.
    #[error("ticket form not ready: `{selector}` absent after {timeout:?}")]
    FormNotReady { selector: String, timeout: Duration },

    /// A selector did not appear within its bounded wait. Callers map this to
    /// `Authentication` or `FormNotReady` depending on which flow was waiting.
    #[error("element `{selector}` not found within {timeout:?}")]
    ElementTimeout { selector: String, timeout: Duration },

    /// Chrome DevTools protocol error from chromiumoxide.
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// User storage file could not be read or written.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A batch TOML file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Every text-generation provider in the chain failed.
    #[error("all text-generation providers failed: {0}")]
    Llm(String),

    /// The model answered but no bug report could be extracted from it.
    #[error("could not extract a bug report from the model response")]
    ReportParse,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse error classification recorded per failed batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Navigation,
    Authentication,
    FormNotReady,
    Browser,
    Other,
}

impl AppError {
    /// The kind used when recording a per-item failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Navigation { .. } => ErrorKind::Navigation,
            AppError::Authentication { .. } => ErrorKind::Authentication,
            AppError::FormNotReady { .. } | AppError::ElementTimeout { .. } => {
                ErrorKind::FormNotReady
            }
            AppError::SessionNotOpen | AppError::Launch(_) | AppError::Cdp(_) => {
                ErrorKind::Browser
            }
            _ => ErrorKind::Other,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Navigation => "navigation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::FormNotReady => "form-not-ready",
            ErrorKind::Browser => "browser",
            ErrorKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}
