//! Tracing setup: a console layer on stderr plus a per-run log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::VerbositySetting;
use crate::context::SetupError;

/// Inputs that decide the effective log level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings {
    /// `-v` count from the command line.
    pub verbose: u8,
    /// `-q` from the command line.
    pub quiet: bool,
    /// `verbosity` from the config file.
    pub file_verbosity: Option<VerbositySetting>,
    /// Disable ANSI colors on the console layer.
    pub no_color: bool,
}

impl LogSettings {
    /// Level used when `RUST_LOG` does not decide.
    ///
    /// Priority: quiet flag > verbose flag > config file > info.
    #[must_use]
    pub fn default_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => self
                .file_verbosity
                .map_or("info", VerbositySetting::log_level),
            1 => "debug",
            _ => "trace",
        }
    }

    /// A level flag given on the command line overrides `RUST_LOG`.
    #[must_use]
    pub fn force_cli_level(&self) -> bool {
        self.quiet || self.verbose > 0
    }

    /// Level for the log file: never below `info`, raised by `-v` or the
    /// config file.
    #[must_use]
    pub fn file_level(&self) -> &'static str {
        let quiet_console = LogSettings {
            quiet: false,
            ..*self
        };
        match quiet_console.default_level() {
            level @ ("debug" | "trace") => level,
            _ => "info",
        }
    }

    fn filter(&self) -> EnvFilter {
        if self.force_cli_level() {
            EnvFilter::new(self.default_level())
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_level()))
        }
    }
}

/// Installs the global subscriber writing to stderr and to `log_file`.
///
/// The console honours `-q`, `-v` and `RUST_LOG`. The file always records at
/// least `info`, and is appended to if it already exists. Installing twice in
/// one process keeps the first subscriber.
///
/// # Errors
///
/// Returns [`SetupError::OpenLogFile`] when the log file cannot be created.
pub fn init(settings: &LogSettings, log_file: &Path) -> Result<(), SetupError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|source| SetupError::OpenLogFile {
            path: log_file.to_path_buf(),
            source,
        })?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!settings.no_color)
        .with_filter(settings.filter());
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new(settings.file_level()));

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

/// `NO_COLOR` set to a non-empty value, or a dumb terminal.
#[must_use]
pub fn no_color_requested() -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    no_color_env || is_dumb_terminal()
}

#[must_use]
pub fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}
