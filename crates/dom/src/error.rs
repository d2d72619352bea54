//! Error types for host page operations.

use thiserror::Error;

/// Errors surfaced by selector parsing and element watching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The selector is malformed or uses unsupported syntax.
    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// No matching element appeared within the requested bound.
    #[error("element \"{selector}\" not found within {timeout_ms}ms")]
    Timeout { selector: String, timeout_ms: u64 },

    /// The host dropped the change subscription before a match was seen.
    #[error("change subscription for \"{selector}\" closed before a match")]
    ObserverClosed { selector: String },
}

pub type Result<T> = std::result::Result<T, DomError>;
