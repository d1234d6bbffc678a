//! Download engine: runs download tasks over a URL list with bounded concurrency.
//!
//! # Concurrency Model
//!
//! - A semaphore sized to the worker count bounds in-flight downloads
//! - Permits are acquired in input order, before each task is spawned
//! - Each task owns its permit and releases it when it finishes (RAII)
//! - A `JoinSet` collects finished tasks in completion order while the
//!   engine keeps submitting, so progress is reported as work completes
//! - The result set is owned by the engine loop; no locking is needed
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use pdf_batch::download::{DownloadEngine, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(6, Arc::new(HttpClient::new()))?;
//! let urls = vec!["https://example.com/paper.pdf".to_string()];
//! let results = engine.run_all(&urls, Path::new("./downloaded_pdfs")).await?;
//! println!("ok: {}, failed: {}", results.successful().len(), results.failed().len());
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use super::client::Fetcher;
use super::constants::REQUEST_TIMEOUT_SECS;
use super::task::fetch_pdf;
use crate::outcome::{DownloadOutcome, ResultSet};

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 100;

/// Default worker count.
pub const DEFAULT_WORKERS: usize = 6;

/// Error type for download engine operations.
///
/// Per-URL failures never show up here; they are failed outcomes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,

    /// A download task was cancelled by the runtime before it finished.
    #[error("download task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// One completed task, as seen by a [`ProgressReporter`].
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate<'a> {
    /// Tasks finished so far, including this one.
    pub completed: usize,
    /// Tasks in the run.
    pub total: usize,
    /// Outcome of the task that just finished.
    pub outcome: &'a DownloadOutcome,
}

impl ProgressUpdate<'_> {
    /// Share of the run finished, 0.0 to 100.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Observer notified once per finished task, in completion order.
pub trait ProgressReporter: Send + Sync {
    /// Called from the engine loop after the outcome has been recorded.
    fn on_progress(&self, update: &ProgressUpdate<'_>);
}

/// Runs download tasks over a URL list with a fixed worker limit.
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured worker limit.
    max_workers: usize,
    /// Shared HTTP capability.
    fetcher: Arc<dyn Fetcher>,
    /// Timeout applied to every request.
    request_timeout: Duration,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("max_workers", &self.max_workers)
            .field("request_timeout", &self.request_timeout)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates an engine running at most `max_workers` downloads at once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use pdf_batch::download::{DownloadEngine, HttpClient};
    ///
    /// let engine = DownloadEngine::new(6, Arc::new(HttpClient::new())).unwrap();
    /// assert_eq!(engine.max_workers(), 6);
    /// ```
    #[instrument(level = "debug", skip(fetcher))]
    pub fn new(max_workers: usize, fetcher: Arc<dyn Fetcher>) -> Result<Self, EngineError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&max_workers) {
            return Err(EngineError::InvalidConcurrency { value: max_workers });
        }

        debug!(max_workers, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            fetcher,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            progress: None,
        })
    }

    /// Overrides the per-request timeout (default 30 seconds).
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Attaches an observer notified after each finished task.
    #[must_use]
    pub fn with_progress(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(reporter);
        self
    }

    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Downloads every URL into `output_dir` and returns all outcomes.
    ///
    /// Returns only when every task has finished. Exactly one outcome is
    /// recorded per input URL; the order inside each list of the result set
    /// is completion order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed and
    /// [`EngineError::Join`] if the runtime cancels a task. Individual
    /// download failures do NOT cause this method to error.
    #[instrument(skip(self, urls), fields(total = urls.len(), output_dir = %output_dir.display()))]
    pub async fn run_all(
        &self,
        urls: &[String],
        output_dir: &Path,
    ) -> Result<ResultSet, EngineError> {
        let total = urls.len();
        info!(
            "Starting download of {total} PDFs with {} workers",
            self.max_workers
        );

        let mut results = ResultSet::new();
        let mut in_flight: JoinSet<DownloadOutcome> = JoinSet::new();
        let mut pending = urls.iter();
        let mut next_url = pending.next();
        let mut completed = 0usize;

        loop {
            tokio::select! {
                biased;

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    let outcome = joined?;
                    completed += 1;
                    self.report_progress(completed, total, &outcome);
                    results.record(outcome);
                }

                permit = Arc::clone(&self.semaphore).acquire_owned(), if next_url.is_some() => {
                    let permit = permit.map_err(|_| EngineError::SemaphoreClosed)?;
                    if let Some(url) = next_url.take() {
                        let url = url.clone();
                        let fetcher = Arc::clone(&self.fetcher);
                        let output_dir = output_dir.to_path_buf();
                        let timeout = self.request_timeout;

                        debug!(url = %url, "dispatching download");
                        in_flight.spawn(async move {
                            // Permit is dropped when this block exits (RAII)
                            let _permit = permit;
                            run_isolated(fetcher.as_ref(), &url, &output_dir, timeout).await
                        });
                    }
                    next_url = pending.next();
                }

                else => break,
            }
        }

        info!(
            successful = results.successful().len(),
            failed = results.failed().len(),
            total,
            "all downloads finished"
        );
        Ok(results)
    }

    fn report_progress(&self, completed: usize, total: usize, outcome: &DownloadOutcome) {
        let update = ProgressUpdate {
            completed,
            total,
            outcome,
        };
        info!("Progress: {completed}/{total} ({:.1}%)", update.percent());
        if let Some(reporter) = &self.progress {
            reporter.on_progress(&update);
        }
    }
}

/// Runs one download, turning a panic into a failed outcome for its URL.
async fn run_isolated(
    fetcher: &dyn Fetcher,
    url: &str,
    output_dir: &Path,
    timeout: Duration,
) -> DownloadOutcome {
    match AssertUnwindSafe(fetch_pdf(fetcher, url, output_dir, timeout))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(url = %url, %message, "Unexpected error downloading {url}: task panicked");
            DownloadOutcome::failed(url, format!("download task panicked: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
