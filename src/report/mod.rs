//! Run summary: counts, success rate and averages over a result set.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::failure::{FailureCategory, classify_failure};
use crate::outcome::ResultSet;

/// Aggregate statistics for one run.
///
/// `success_rate_percent` is `None` for an empty run; the averages are
/// `None` when nothing succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_time_secs: f64,
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub success_rate_percent: Option<f64>,
    pub avg_size_kb: Option<f64>,
    pub avg_download_time_secs: Option<f64>,
    /// Failed outcomes per category; categories with no failures are absent.
    pub failures_by_category: BTreeMap<FailureCategory, usize>,
}

/// Computes the summary of `results`. Pure; `total_elapsed` is the run's wall time.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(results: &ResultSet, total_elapsed: Duration) -> Summary {
    let success_count = results.successful().len();
    let failed_count = results.failed().len();
    let total_count = success_count + failed_count;

    let success_rate_percent =
        (total_count > 0).then(|| success_count as f64 / total_count as f64 * 100.0);

    let mean = |values: Vec<f64>| -> Option<f64> {
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    };
    let avg_size_kb = mean(
        results
            .successful()
            .iter()
            .filter_map(crate::outcome::DownloadOutcome::size_kb)
            .collect(),
    );
    let avg_download_time_secs = mean(
        results
            .successful()
            .iter()
            .filter_map(crate::outcome::DownloadOutcome::download_time_secs)
            .collect(),
    );

    let mut failures_by_category = BTreeMap::new();
    for outcome in results.failed() {
        let category = classify_failure(outcome.error().unwrap_or_default());
        *failures_by_category.entry(category).or_insert(0) += 1;
    }

    Summary {
        total_time_secs: total_elapsed.as_secs_f64(),
        total_count,
        success_count,
        failed_count,
        success_rate_percent,
        avg_size_kb,
        avg_download_time_secs,
        failures_by_category,
    }
}

/// Emits the end-of-run report to the log.
pub fn log_summary(summary: &Summary) {
    info!("=== Download Summary ===");
    info!("Total time: {:.2} seconds", summary.total_time_secs);
    info!("Total PDFs: {}", summary.total_count);
    info!("Successfully downloaded: {}", summary.success_count);
    info!("Failed: {}", summary.failed_count);
    match summary.success_rate_percent {
        Some(rate) => info!("Success rate: {rate:.1}%"),
        None => info!("Success rate: n/a"),
    }

    if let (Some(avg_size), Some(avg_time)) =
        (summary.avg_size_kb, summary.avg_download_time_secs)
    {
        info!("Average file size: {avg_size:.2}KB");
        info!("Average download time: {avg_time:.2}s");
    }

    for (category, count) in &summary.failures_by_category {
        info!(category = ?category, count, "{} failures: {count}", category.label());
    }
}
