//! Concurrent PDF download pipeline.
//!
//! - [`client`]: the [`Fetcher`] capability and its `reqwest` implementation
//! - [`filename`]: content-fingerprinted output names
//! - [`task`]: one URL fetched, validated and written
//! - [`engine`]: bounded-concurrency dispatch over a URL list
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use pdf_batch::download::{HttpClient, fetch_pdf};
//!
//! # async fn example() {
//! let client = HttpClient::new();
//! let outcome = fetch_pdf(
//!     &client,
//!     "https://example.com/paper.pdf",
//!     Path::new("./downloaded_pdfs"),
//!     Duration::from_secs(30),
//! )
//! .await;
//! println!("{outcome:?}");
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod filename;
mod task;

pub use client::{FetchResponse, Fetcher, HttpClient};
pub use engine::{
    DEFAULT_WORKERS, DownloadEngine, EngineError, ProgressReporter, ProgressUpdate,
};
pub use error::DownloadError;
pub use filename::{content_fingerprint, pdf_filename};
pub use task::{SavedPdf, fetch_and_save, fetch_pdf};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
