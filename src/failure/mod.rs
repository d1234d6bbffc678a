//! Failure classification for recorded outcome errors.
//!
//! Outcomes keep only the error's display text, so classification works on
//! that text. The prefixes matched here are the ones produced by
//! [`DownloadError`](crate::download::DownloadError).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// DNS, connect, timeout, non-2xx, or an unusable URL.
    Transport,
    /// The response was not declared as a PDF.
    ContentType,
    /// Anything else caught at the task boundary (write failures, panics).
    Internal,
}

impl FailureCategory {
    pub const ALL: [Self; 3] = [Self::Transport, Self::ContentType, Self::Internal];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::ContentType => "Content type",
            Self::Internal => "Internal",
        }
    }
}

/// Classifies an outcome error message into a category.
#[must_use]
pub fn classify_failure(error: &str) -> FailureCategory {
    if error.starts_with("Not a PDF file") {
        FailureCategory::ContentType
    } else if error.starts_with("network error")
        || error.starts_with("timeout")
        || error.starts_with("HTTP ")
        || error.starts_with("invalid URL")
    {
        FailureCategory::Transport
    } else {
        FailureCategory::Internal
    }
}
