//! Explicit per-run setup: directories, run stamp and the resolved config.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::clock::{FixedClock, RunClock};
use crate::config::RunConfig;
use crate::store::ResultStore;

/// Errors that abort a run before any download is dispatched.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shared state built during startup so later stages take one handle
/// instead of many arguments.
pub struct RunContext {
    config: RunConfig,
    run_stamp: String,
}

impl RunContext {
    /// Creates the output, log and results directories and fixes the run stamp.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::CreateDir`] when a directory cannot be created.
    pub fn prepare(config: RunConfig, clock: &dyn RunClock) -> Result<Self, SetupError> {
        for dir in [&config.output_dir, &config.log_dir, &config.results_dir] {
            ensure_dir(dir)?;
        }
        Ok(Self {
            config,
            run_stamp: clock.run_stamp(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Stamp shared by this run's log file and results file.
    #[must_use]
    pub fn run_stamp(&self) -> &str {
        &self.run_stamp
    }

    #[must_use]
    pub fn log_file_path(&self) -> PathBuf {
        self.config
            .log_dir
            .join(format!("pdf_downloader_{}.log", self.run_stamp))
    }

    /// Result store writing into the results directory under this run's stamp.
    #[must_use]
    pub fn result_store(&self) -> ResultStore {
        ResultStore::new(
            self.config.results_dir.clone(),
            Arc::new(FixedClock::new(self.run_stamp.clone())),
        )
    }
}

fn ensure_dir(dir: &Path) -> Result<(), SetupError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| SetupError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!(dir = %dir.display(), "Created directory");
    Ok(())
}
