//! Loading the URL list for a run.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Default URL list file name.
pub const DEFAULT_INPUT_FILE: &str = "pdf_links.json";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read URL list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("URL list {path} is not a JSON array of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a JSON array of URL strings.
///
/// Entries are trimmed and otherwise passed through in order; a malformed
/// URL is not rejected here; it becomes a failed outcome during the run.
///
/// # Errors
///
/// Returns [`InputError::Read`] when the file cannot be read and
/// [`InputError::Parse`] when it is not a JSON array of strings.
pub fn load_urls(path: &Path) -> Result<Vec<String>, InputError> {
    let raw = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_urls(&raw).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(count = urls.len(), path = %path.display(), "Loaded URL list");
    Ok(urls)
}

fn parse_urls(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<String> = serde_json::from_str(raw)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let trimmed = entry.trim();
            if trimmed.len() != entry.len() {
                debug!(url = %trimmed, "Trimmed whitespace around URL");
            }
            trimmed.to_string()
        })
        .collect())
}
