//! Per-page outcome definitions
//!
//! Every dispatched fetch ends in exactly one of these states. Everything but
//! `Processed` counts as a skipped page.

use serde::Serialize;
use std::fmt;

/// Represents how the fetch of a single page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    // ===== Terminal Success States =====
    /// Page was successfully fetched and processed
    Processed,

    // ===== Terminal Error States =====
    /// Page returned HTTP 404 or 410 (permanent failure)
    DeadLink,

    /// Page returned another HTTP status of 400 or above
    HttpError,

    /// The fetch did not finish within the timeout
    TimedOut,

    /// Page could not be reached (connection refused, DNS failure, TLS error)
    Unreachable,

    /// Page fetch failed for other reasons (redirect loop, body error, task failure)
    Failed,
}

impl PageState {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Converts the page state to its report key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::DeadLink => "dead_link",
            Self::HttpError => "http_error",
            Self::TimedOut => "timed_out",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }

    /// Maps an HTTP error status to its page state
    pub fn from_status(status: u16) -> Self {
        match status {
            404 | 410 => Self::DeadLink,
            _ => Self::HttpError,
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> &'static [PageState] {
        &[
            Self::Processed,
            Self::DeadLink,
            Self::HttpError,
            Self::TimedOut,
            Self::Unreachable,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
