//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use pdf_batch::config::ConfigOverrides;

/// Concurrently download a list of PDF files.
///
/// Reads a JSON array of URLs, fetches them with a bounded worker pool, keeps
/// only responses declared as PDF, and writes a timestamped results record.
#[derive(Parser, Debug)]
#[command(name = "pdf-batch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// JSON file holding an array of URLs [default: pdf_links.json]
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory downloaded PDFs are written to [default: downloaded_pdfs]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent downloads (1-100) [default: 6]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub workers: Option<u8>,

    /// Per-request timeout in seconds (1-3600) [default: 30]
    #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Directory for the per-run log file [default: logs]
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Directory for the per-run results file [default: .]
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/pdf-batch/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show a progress bar on interactive terminals
    #[arg(long)]
    pub progress: bool,

    /// Exit with code 2 when any URL failed
    #[arg(long)]
    pub fail_on_error: bool,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            workers: self.workers.map(usize::from),
            timeout_secs: self.timeout,
            log_dir: self.log_dir.clone(),
            results_dir: self.results_dir.clone(),
        }
    }
}
