//! Output filename derivation for downloaded PDFs.
//!
//! Names follow `{base}_{fingerprint}.pdf`, where `base` is the decoded last
//! URL path segment without its extension and `fingerprint` is the first
//! eight hex characters of the MD5 digest of the body. Two URLs that share a
//! last segment but serve different bytes get different names, while the same
//! bytes from the same path always map to the same name, so a rerun rewrites
//! the earlier file instead of creating a sibling.

use url::Url;

use super::constants::{FALLBACK_BASE_NAME, FINGERPRINT_LEN, PDF_EXTENSION};

/// Builds the output filename for a downloaded body.
///
/// Pure: no filesystem access, same inputs always give the same name.
///
/// # Example
///
/// ```
/// use pdf_batch::download::pdf_filename;
///
/// let name = pdf_filename("https://example.com/papers/Deep%20Nets.pdf", b"%PDF-1.7");
/// assert!(name.starts_with("Deep Nets_"));
/// assert!(name.ends_with(".pdf"));
/// ```
#[must_use]
pub fn pdf_filename(url: &str, content: &[u8]) -> String {
    let segment = last_path_segment(url);
    let decoded = urlencoding::decode(&segment)
        .map_or_else(|_| segment.clone(), std::borrow::Cow::into_owned);
    let base = sanitize_base(strip_extension(&decoded));
    let base = if base.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        base
    };
    format!("{base}_{}.{PDF_EXTENSION}", content_fingerprint(content))
}

/// First [`FINGERPRINT_LEN`] lowercase hex characters of the MD5 digest.
#[must_use]
pub fn content_fingerprint(content: &[u8]) -> String {
    let digest = format!("{:x}", md5::compute(content));
    digest[..FINGERPRINT_LEN].to_string()
}

/// Raw (still percent-encoded) last path segment of `url`.
fn last_path_segment(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        return parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
            .to_string();
    }

    let without_suffix = url.split(['?', '#']).next().unwrap_or("");
    without_suffix
        .rsplit('/')
        .next()
        .unwrap_or(without_suffix)
        .to_string()
}

/// Drops the final `.ext`. Leading dots belong to the name, so `.hidden`
/// keeps its full text.
fn strip_extension(name: &str) -> &str {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(pos) => &name[..leading + pos],
        None => name,
    }
}

/// Replaces characters that would let a decoded segment leave the output
/// directory or that common filesystems reject.
fn sanitize_base(base: &str) -> String {
    base.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
