//! Single-URL download task: fetch, validate, name, write.
//!
//! The task never returns an error. Whatever goes wrong is logged and folded
//! into a failed [`DownloadOutcome`] so sibling tasks are unaffected.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use super::client::{FetchResponse, Fetcher};
use super::constants::PDF_CONTENT_TYPE_MARKER;
use super::error::DownloadError;
use super::filename::pdf_filename;
use crate::outcome::DownloadOutcome;

/// Saved file details produced by a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPdf {
    /// Filename inside the output directory.
    pub filename: String,
    /// Full path written.
    pub path: PathBuf,
    /// Number of body bytes written.
    pub bytes: usize,
}

/// Downloads one URL and reports the result as an outcome.
///
/// Single attempt, no retry. The file is written only after the whole body
/// is buffered and its content type validated, so failures leave nothing on
/// disk. A same-named file from an earlier run is overwritten.
#[instrument(skip(fetcher, output_dir), fields(url = %url))]
pub async fn fetch_pdf(
    fetcher: &dyn Fetcher,
    url: &str,
    output_dir: &Path,
    timeout: Duration,
) -> DownloadOutcome {
    let started = Instant::now();
    info!("Starting download: {url}");

    match fetch_and_save(fetcher, url, output_dir, timeout).await {
        Ok(saved) => {
            let download_time = started.elapsed().as_secs_f64();
            #[allow(clippy::cast_precision_loss)]
            let size_kb = saved.bytes as f64 / 1024.0;

            info!("Successfully downloaded: {url}");
            info!("Saved as: {}", saved.filename);
            info!("Download time: {download_time:.2}s");
            info!("File size: {size_kb:.2}KB");

            DownloadOutcome::success(url, saved.filename, size_kb, download_time)
        }
        Err(e) => {
            if e.is_transport() {
                error!(error = %e, "Failed to download {url}: {e}");
            } else {
                error!(error = %e, "Unexpected error downloading {url}: {e}");
            }
            DownloadOutcome::failed(url, e.to_string())
        }
    }
}

/// Fetches, validates and writes one file.
///
/// # Errors
///
/// Returns the transport error from the fetcher, [`DownloadError::NotPdf`]
/// when the content type lacks the PDF marker, or [`DownloadError::Io`] when
/// the write fails.
pub async fn fetch_and_save(
    fetcher: &dyn Fetcher,
    url: &str,
    output_dir: &Path,
    timeout: Duration,
) -> Result<SavedPdf, DownloadError> {
    let response = fetcher.get(url, timeout).await?;
    ensure_pdf(url, &response)?;

    let filename = pdf_filename(url, &response.body);
    let path = output_dir.join(&filename);
    tokio::fs::write(&path, &response.body)
        .await
        .map_err(|e| DownloadError::io(path.clone(), e))?;

    Ok(SavedPdf {
        filename,
        path,
        bytes: response.body.len(),
    })
}

/// Case-insensitive check for the PDF media type in `Content-Type`.
fn ensure_pdf(url: &str, response: &FetchResponse) -> Result<(), DownloadError> {
    let content_type = response
        .content_type
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    if content_type.contains(PDF_CONTENT_TYPE_MARKER) {
        Ok(())
    } else {
        Err(DownloadError::not_pdf(url, content_type))
    }
}
