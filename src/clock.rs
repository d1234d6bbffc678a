//! Run stamp source used to name per-run log and result files.

use chrono::Local;

/// Format of the run stamp, e.g. `20240131_235959`.
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Produces the stamp that ties a run's log file and result file together.
pub trait RunClock: Send + Sync {
    fn run_stamp(&self) -> String;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl RunClock for SystemClock {
    fn run_stamp(&self) -> String {
        Local::now().format(RUN_STAMP_FORMAT).to_string()
    }
}

/// Clock that always returns the same stamp.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    #[must_use]
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }
}

impl RunClock for FixedClock {
    fn run_stamp(&self) -> String {
        self.0.clone()
    }
}
