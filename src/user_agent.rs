//! User-Agent string sent with every download request.

/// Project URL embedded in the User-Agent (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/pdf-batch";

/// Default User-Agent for download requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pdf-batch/{version} (batch-pdf-fetcher; +{PROJECT_UA_URL})")
}
