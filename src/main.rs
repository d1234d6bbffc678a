//! CLI entry point for pdf-batch.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use pdf_batch::clock::SystemClock;
use pdf_batch::config::{self, RunConfig};
use pdf_batch::context::RunContext;
use pdf_batch::download::{DownloadEngine, HttpClient, ProgressReporter};
use pdf_batch::input;
use pdf_batch::logging::{self, LogSettings};
use pdf_batch::progress::{ProgressBarReporter, should_show_progress};
use pdf_batch::report::{Summary, log_summary, summarize};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

/// Process exit outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    /// Some URLs failed and `--fail-on-error` was given.
    Partial,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Partial => ExitCode::from(2),
        }
    }
}

/// Setup errors surface through `Result` and exit with code 1.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let exit = run(args).await?;
    Ok(exit.into())
}

async fn run(args: Args) -> Result<ProcessExit> {
    let loaded = config::load_file_config(args.config.as_deref())?;
    let file_config = loaded.config.as_ref();
    let run_config = RunConfig::resolve(&args.overrides(), file_config)?;

    let ctx = RunContext::prepare(run_config, &SystemClock)?;

    let log_settings = LogSettings {
        verbose: args.verbose,
        quiet: args.quiet,
        file_verbosity: file_config.and_then(|c| c.verbosity),
        no_color: args.no_color || logging::no_color_requested(),
    };
    logging::init(&log_settings, &ctx.log_file_path())?;

    debug!(?args, "CLI arguments parsed");
    debug!(config = ?ctx.config(), config_path = ?loaded.path, "Configuration resolved");
    info!(log_file = %ctx.log_file_path().display(), "pdf-batch starting");
    info!("Output directory set to: {}", ctx.config().output_dir.display());

    let urls = input::load_urls(&ctx.config().input)
        .with_context(|| format!("Cannot load URL list '{}'", ctx.config().input.display()))?;
    if urls.is_empty() {
        warn!("URL list is empty; nothing to download");
    }

    let client = HttpClient::try_new().context("Failed to build HTTP client")?;
    let engine = DownloadEngine::new(ctx.config().workers, Arc::new(client))?
        .with_request_timeout(ctx.config().request_timeout());

    let show_progress = should_show_progress(
        args.progress,
        io::stderr().is_terminal(),
        args.quiet,
        logging::is_dumb_terminal(),
    );
    let progress = show_progress.then(|| Arc::new(ProgressBarReporter::new(urls.len())));
    let engine = attach_progress(engine, progress.as_ref());

    let started = Instant::now();
    let results = engine.run_all(&urls, &ctx.config().output_dir).await?;
    let elapsed = started.elapsed();

    if let Some(reporter) = &progress {
        reporter.finish();
    }

    let summary = summarize(&results, elapsed);
    log_summary(&summary);

    let path = ctx
        .result_store()
        .persist(&results)
        .context("Failed to save results")?;
    debug!(path = %path.display(), "Run record written");

    Ok(determine_exit_outcome(&summary, args.fail_on_error))
}

fn attach_progress(
    engine: DownloadEngine,
    reporter: Option<&Arc<ProgressBarReporter>>,
) -> DownloadEngine {
    match reporter {
        Some(reporter) => engine.with_progress(Arc::clone(reporter) as Arc<dyn ProgressReporter>),
        None => engine,
    }
}

fn determine_exit_outcome(summary: &Summary, fail_on_error: bool) -> ProcessExit {
    if fail_on_error && summary.failed_count > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pdf_batch::outcome::{DownloadOutcome, ResultSet};
    use std::time::Duration;
    use tempfile::TempDir;

    fn summary_with(failed: usize) -> Summary {
        let mut results = ResultSet::new();
        results.record(DownloadOutcome::success("a", "a.pdf", 1.0, 1.0));
        for i in 0..failed {
            results.record(DownloadOutcome::failed(format!("u{i}"), "timeout"));
        }
        summarize(&results, Duration::ZERO)
    }

    #[test]
    fn test_exit_outcome_success_without_failures() {
        assert_eq!(
            determine_exit_outcome(&summary_with(0), true),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_failures_ignored_by_default() {
        assert_eq!(
            determine_exit_outcome(&summary_with(2), false),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_partial_with_fail_on_error() {
        assert_eq!(
            determine_exit_outcome(&summary_with(1), true),
            ProcessExit::Partial
        );
    }

    #[tokio::test]
    async fn test_attached_progress_bar_sees_every_completion() {
        let dir = TempDir::new().unwrap();
        let reporter = Arc::new(ProgressBarReporter::hidden(2));
        let engine = DownloadEngine::new(2, Arc::new(HttpClient::new())).unwrap();
        let engine = attach_progress(engine, Some(&reporter));

        let urls = vec!["not a url".to_string(), String::new()];
        let results = engine.run_all(&urls, dir.path()).await.unwrap();

        assert_eq!(results.failed().len(), 2);
        assert_eq!(reporter.position(), 2);
    }

    #[tokio::test]
    async fn test_no_progress_bar_leaves_engine_unchanged() {
        let dir = TempDir::new().unwrap();
        let engine = DownloadEngine::new(1, Arc::new(HttpClient::new())).unwrap();
        let engine = attach_progress(engine, None);

        let results = engine.run_all(&[], dir.path()).await.unwrap();
        assert!(results.is_empty());
    }
}
