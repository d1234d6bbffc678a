//! Terminal progress bar fed by the download engine.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::download::{ProgressReporter, ProgressUpdate};

/// Bar on stderr advanced once per finished download.
#[derive(Debug, Clone)]
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    /// Reporter that tracks positions without drawing.
    #[must_use]
    pub fn hidden(total: usize) -> Self {
        let reporter = Self::new(total);
        reporter.bar.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn on_progress(&self, update: &ProgressUpdate<'_>) {
        self.bar.set_position(update.completed as u64);
        let mark = if update.outcome.is_success() { "ok" } else { "failed" };
        self.bar
            .set_message(format!("{mark}: {}", update.outcome.url()));
    }
}

/// Draw the bar only when asked for, on an interactive non-dumb stderr, and not in quiet mode.
#[must_use]
pub fn should_show_progress(
    requested: bool,
    stderr_is_terminal: bool,
    quiet: bool,
    dumb_terminal: bool,
) -> bool {
    requested && stderr_is_terminal && !quiet && !dumb_terminal
}
