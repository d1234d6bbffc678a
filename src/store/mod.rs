//! Persistence of a run's outcomes to a timestamped JSON file.
//!
//! The record has the shape `{"successful": [...], "failed": [...]}` and is
//! named `download_results_{run_stamp}.json`. It is written to a `.tmp`
//! sibling first and renamed into place, so a reader sees either nothing or
//! the complete file.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::clock::RunClock;
use crate::outcome::ResultSet;

/// Prefix of every results file name.
pub const RESULTS_FILE_PREFIX: &str = "download_results_";

/// Errors produced while writing or reading a results file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error on the results file or its temporary sibling.
    #[error("I/O error on results file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON (de)serialization error.
    #[error("JSON error on results file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Writes result sets into a directory, one file per run.
pub struct ResultStore {
    dir: PathBuf,
    clock: Arc<dyn RunClock>,
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl ResultStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn RunClock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next `persist` call would write, using the clock's current stamp.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.dir.join(format!(
            "{RESULTS_FILE_PREFIX}{}.json",
            self.clock.run_stamp()
        ))
    }

    /// Writes `results` as pretty-printed JSON and returns the final path.
    ///
    /// An existing file with the same stamp is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be written or renamed.
    #[instrument(skip(self, results), fields(dir = %self.dir.display(), outcomes = results.len()))]
    pub fn persist(&self, results: &ResultSet) -> Result<PathBuf, StoreError> {
        let path = self.results_path();
        let tmp_path = path.with_extension("json.tmp");

        if let Err(err) = write_json(&tmp_path, results) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io(&path, e)
        })?;

        info!("Results saved to {}", path.display());
        Ok(path)
    }

    /// Reads a results file written by [`ResultStore::persist`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file is missing or not a valid record.
    pub fn load(path: &Path) -> Result<ResultSet, StoreError> {
        let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::json(path, e))
    }
}

fn write_json(path: &Path, results: &ResultSet) -> Result<(), StoreError> {
    let file = fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results).map_err(|e| StoreError::json(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    debug!(path = %path.display(), "Temporary results file written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::outcome::DownloadOutcome;
    use tempfile::TempDir;

    fn store_in(dir: &Path) -> ResultStore {
        ResultStore::new(dir, Arc::new(FixedClock::new("20240102_030405")))
    }

    fn sample() -> ResultSet {
        let mut results = ResultSet::new();
        results.record(DownloadOutcome::success(
            "https://e.com/a.pdf",
            "a_12345678.pdf",
            1.5,
            0.25,
        ));
        results.record(DownloadOutcome::failed(
            "https://e.com/b.pdf",
            "HTTP 404 downloading https://e.com/b.pdf",
        ));
        results
    }

    #[test]
    fn test_persist_writes_stamped_file() {
        let tmp = TempDir::new().unwrap();
        let path = store_in(tmp.path()).persist(&sample()).unwrap();

        assert_eq!(
            path,
            tmp.path().join("download_results_20240102_030405.json")
        );
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_persist_shape_matches_record_format() {
        let tmp = TempDir::new().unwrap();
        let path = store_in(tmp.path()).persist(&sample()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'), "expected pretty-printed JSON");
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let ok = &value["successful"][0];
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["filename"], "a_12345678.pdf");
        assert_eq!(ok["size_kb"], 1.5);
        assert_eq!(ok["download_time"], 0.25);
        assert!(ok.get("error").is_none());

        let failed = &value["failed"][0];
        assert_eq!(failed["status"], "failed");
        assert!(failed["error"].as_str().unwrap().contains("404"));
        assert!(failed.get("filename").is_none());
    }

    #[test]
    fn test_persist_empty_run_writes_empty_lists() {
        let tmp = TempDir::new().unwrap();
        let path = store_in(tmp.path()).persist(&ResultSet::new()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["successful"].as_array().unwrap().len(), 0);
        assert_eq!(value["failed"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_load_reads_back_persisted_record() {
        let tmp = TempDir::new().unwrap();
        let results = sample();
        let path = store_in(tmp.path()).persist(&results).unwrap();

        assert_eq!(ResultStore::load(&path).unwrap(), results);
    }

    #[test]
    fn test_persist_into_missing_dir_fails_without_leftovers() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = store_in(&missing).persist(&sample()).unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }), "got {err:?}");
        assert!(!missing.exists());
    }

    #[test]
    fn test_load_rejects_non_record_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bogus.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = ResultStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }), "got {err:?}");
    }
}
