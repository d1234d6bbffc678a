//! Constants for the download module (timeouts, validation, defaults).

/// Per-request timeout covering connect, headers and body (30 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Marker that must appear in the lowercased Content-Type header.
pub const PDF_CONTENT_TYPE_MARKER: &str = "application/pdf";

/// Extension given to every saved file.
pub const PDF_EXTENSION: &str = "pdf";

/// Number of hex characters of the content digest kept in filenames.
pub const FINGERPRINT_LEN: usize = 8;

/// Base name used when the URL path has no usable last segment.
pub const FALLBACK_BASE_NAME: &str = "document";
