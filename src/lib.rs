//! pdf-batch Core Library
//!
//! Concurrently downloads a list of PDF URLs, keeps only responses declared as
//! PDF, names each file after its URL and a content fingerprint, and records a
//! per-run summary and results file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - Fetcher capability, naming, single-URL task, bounded engine
//! - [`outcome`] - Per-URL outcomes and the run's result set
//! - [`report`] - Summary statistics and the end-of-run report
//! - [`store`] - Timestamped JSON results file
//! - [`failure`] - Failure categories for summary breakdowns
//! - [`input`] - URL list loading
//! - [`config`], [`context`], [`logging`], [`clock`], [`progress`] - Run setup

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod context;
pub mod download;
pub mod failure;
pub mod input;
pub mod logging;
pub mod outcome;
pub mod progress;
pub mod report;
pub mod store;
pub(crate) mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use context::{RunContext, SetupError};
pub use download::{
    DEFAULT_WORKERS, DownloadEngine, DownloadError, EngineError, Fetcher, HttpClient,
    fetch_pdf, pdf_filename,
};
pub use failure::{FailureCategory, classify_failure};
pub use outcome::{DownloadOutcome, OutcomeStatus, ResultSet};
pub use report::{Summary, summarize};
pub use store::{ResultStore, StoreError};
