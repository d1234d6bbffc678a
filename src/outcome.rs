//! Per-URL outcome records and the run's result set.
//!
//! A [`DownloadOutcome`] is built once by a download task and never changed.
//! The [`ResultSet`] groups outcomes by status in the order tasks finished.

use serde::{Deserialize, Serialize};

/// Terminal status of one URL's download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// File validated and written to disk.
    Success,
    /// Transport, validation or write failure.
    Failed,
}

/// Result record of one URL's download attempt.
///
/// Successful outcomes carry `filename`, `size_kb` and `download_time`;
/// failed outcomes carry only `error`. The constructors are the only way to
/// build one, which keeps the two shapes apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    url: String,
    status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size_kb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    download_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DownloadOutcome {
    /// Outcome for a file that was saved as `filename`.
    #[must_use]
    pub fn success(
        url: impl Into<String>,
        filename: impl Into<String>,
        size_kb: f64,
        download_time_secs: f64,
    ) -> Self {
        Self {
            url: url.into(),
            status: OutcomeStatus::Success,
            filename: Some(filename.into()),
            size_kb: Some(size_kb),
            download_time: Some(download_time_secs),
            error: None,
        }
    }

    /// Outcome for a URL that could not be downloaded.
    #[must_use]
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: OutcomeStatus::Failed,
            filename: None,
            size_kb: None,
            download_time: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Saved filename (successful outcomes only).
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Body size in KiB (successful outcomes only).
    #[must_use]
    pub fn size_kb(&self) -> Option<f64> {
        self.size_kb
    }

    /// Wall-clock seconds from request start to file written (successful outcomes only).
    #[must_use]
    pub fn download_time_secs(&self) -> Option<f64> {
        self.download_time
    }

    /// Failure description (failed outcomes only).
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// All outcomes of a run, split by status.
///
/// Append-only; each list is in completion order, not input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    successful: Vec<DownloadOutcome>,
    failed: Vec<DownloadOutcome>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `outcome` to the list matching its status.
    pub fn record(&mut self, outcome: DownloadOutcome) {
        match outcome.status() {
            OutcomeStatus::Success => self.successful.push(outcome),
            OutcomeStatus::Failed => self.failed.push(outcome),
        }
    }

    #[must_use]
    pub fn successful(&self) -> &[DownloadOutcome] {
        &self.successful
    }

    #[must_use]
    pub fn failed(&self) -> &[DownloadOutcome] {
        &self.failed
    }

    /// Total number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
