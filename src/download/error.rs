//! Error types for the download module.
//!
//! Every variant carries the URL or path it concerns so the display text can
//! be stored verbatim in a failed outcome.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching and saving a single file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The response did not declare a PDF media type.
    #[error("Not a PDF file. Content-Type: {content_type}")]
    NotPdf {
        /// The URL whose response was rejected.
        url: String,
        /// The lowercased Content-Type header (empty when absent).
        content_type: String,
    },

    /// File system error while saving the body.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a content-type mismatch error.
    pub fn not_pdf(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self::NotPdf {
            url: url.into(),
            content_type: content_type.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for failures raised before a usable response arrived.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Timeout { .. }
                | Self::HttpStatus { .. }
                | Self::InvalidUrl { .. }
        )
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the url
// or path, which the source errors don't carry. Use the constructors above.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.com/file.pdf");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/file.pdf"));
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://example.com/file.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/file.pdf"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_download_error_not_pdf_display_matches_report_format() {
        let error = DownloadError::not_pdf("https://example.com/page", "text/html; charset=utf-8");
        assert_eq!(
            error.to_string(),
            "Not a PDF file. Content-Type: text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_download_error_not_pdf_display_with_missing_header() {
        let error = DownloadError::not_pdf("https://example.com/page", "");
        assert_eq!(error.to_string(), "Not a PDF file. Content-Type: ");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/test.pdf"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/test.pdf"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(
            msg.contains("invalid URL"),
            "Expected 'invalid URL' in: {msg}"
        );
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_is_transport_partitions_variants() {
        assert!(DownloadError::timeout("u").is_transport());
        assert!(DownloadError::http_status("u", 500).is_transport());
        assert!(DownloadError::invalid_url("u").is_transport());
        assert!(!DownloadError::not_pdf("u", "text/html").is_transport());
        let io_error = std::io::Error::other("disk full");
        assert!(!DownloadError::io("/tmp/x.pdf", io_error).is_transport());
    }
}
