//! Integration tests for the download pipeline against a mock HTTP server.
//!
//! These run the real `HttpClient` through `DownloadEngine`, then summarize and
//! persist the result set the way the binary does.

use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pdf_batch::clock::FixedClock;
use pdf_batch::download::{DownloadEngine, DownloadError, FetchResponse, Fetcher, HttpClient};
use pdf_batch::{FailureCategory, ResultSet, ResultStore, summarize};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return socket_skip_return();
        };
        mock_server
    }};
}

fn pdf_response(body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/pdf")
        .set_body_bytes(body.to_vec())
}

fn engine(workers: usize) -> Result<DownloadEngine, pdf_batch::EngineError> {
    DownloadEngine::new(workers, Arc::new(HttpClient::new()))
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
}

fn urls_of(outcomes: &[pdf_batch::DownloadOutcome]) -> Vec<String> {
    let mut urls: Vec<String> = outcomes.iter().map(|o| o.url().to_string()).collect();
    urls.sort();
    urls
}

// ==================== Mixed Outcomes ====================

#[tokio::test]
async fn test_two_pdfs_and_a_404_split_and_summarize() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/a.pdf"))
        .respond_with(pdf_response(b"%PDF-1.4 first"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.pdf"))
        .respond_with(pdf_response(b"%PDF-1.4 second"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let a = format!("{base}/a.pdf");
    let b = format!("{base}/b.pdf");
    let c = format!("{base}/c.pdf");
    let urls = vec![a.clone(), b.clone(), c.clone()];

    let output_dir = TempDir::new()?;
    let results = engine(2)?.run_all(&urls, output_dir.path()).await?;

    let mut expected_ok = vec![a, b];
    expected_ok.sort();
    assert_eq!(urls_of(results.successful()), expected_ok);
    assert_eq!(urls_of(results.failed()), vec![c]);
    assert!(results.failed()[0].error().unwrap_or("").contains("404"));
    assert_eq!(file_count(output_dir.path()), 2);

    let summary = summarize(&results, Duration::from_secs(1));
    assert_eq!(summary.total_count, 3);
    let rate = summary.success_rate_percent.ok_or("rate missing")?;
    assert!((rate - 66.7).abs() < 0.1, "rate {rate}");
    assert_eq!(
        summary.failures_by_category.get(&FailureCategory::Transport),
        Some(&1)
    );
    Ok(())
}

#[tokio::test]
async fn test_saved_file_name_and_bytes_match_response() -> Result<(), Box<dyn std::error::Error>>
{
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/papers/report.pdf"))
        .respond_with(pdf_response(b"hello"))
        .mount(&mock_server)
        .await;

    let urls = vec![format!("{}/papers/report.pdf", mock_server.uri())];
    let output_dir = TempDir::new()?;
    let results = engine(1)?.run_all(&urls, output_dir.path()).await?;

    let outcome = &results.successful()[0];
    assert_eq!(outcome.filename(), Some("report_5d41402a.pdf"));
    let saved = std::fs::read(output_dir.path().join("report_5d41402a.pdf"))?;
    assert_eq!(saved, b"hello");
    Ok(())
}

// ==================== Content Type ====================

#[tokio::test]
async fn test_html_response_is_failed_and_not_written() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_bytes(b"%PDF-1.7 but served as html".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let urls = vec![format!("{}/login", mock_server.uri())];
    let output_dir = TempDir::new()?;
    let results = engine(1)?.run_all(&urls, output_dir.path()).await?;

    assert!(results.successful().is_empty());
    assert_eq!(
        results.failed()[0].error(),
        Some("Not a PDF file. Content-Type: text/html; charset=utf-8")
    );
    assert_eq!(file_count(output_dir.path()), 0);
    Ok(())
}

// ==================== Transport Failures ====================

#[tokio::test]
async fn test_connection_refused_is_failed_outcome() -> Result<(), Box<dyn std::error::Error>> {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };
    let urls = vec![format!("http://127.0.0.1:{port}/gone.pdf")];
    let output_dir = TempDir::new()?;

    let results = engine(1)?.run_all(&urls, output_dir.path()).await?;

    assert_eq!(results.failed().len(), 1);
    let error = results.failed()[0].error().unwrap_or("");
    assert!(error.starts_with("network error"), "got: {error}");
    Ok(())
}

#[tokio::test]
async fn test_slow_server_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(pdf_response(b"%PDF").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let urls = vec![format!("{}/slow.pdf", mock_server.uri())];
    let output_dir = TempDir::new()?;
    let results = engine(1)?
        .with_request_timeout(Duration::from_millis(200))
        .run_all(&urls, output_dir.path())
        .await?;

    let error = results.failed()[0].error().unwrap_or("");
    assert!(error.starts_with("timeout"), "got: {error}");
    Ok(())
}

#[tokio::test]
async fn test_malformed_url_is_failed_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = TempDir::new()?;
    let urls = vec!["not a url".to_string(), String::new()];

    let results = engine(2)?.run_all(&urls, output_dir.path()).await?;

    assert_eq!(results.failed().len(), 2);
    assert!(
        results
            .failed()
            .iter()
            .all(|o| o.error().unwrap_or("").starts_with("invalid URL"))
    );
    Ok(())
}

// ==================== Empty Input ====================

#[tokio::test]
async fn test_empty_input_summarizes_and_persists() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = TempDir::new()?;
    let results_dir = TempDir::new()?;

    let results = engine(6)?.run_all(&[], output_dir.path()).await?;
    assert!(results.is_empty());

    let summary = summarize(&results, Duration::ZERO);
    assert_eq!(summary.total_count, 0);
    assert_eq!(summary.success_rate_percent, None);
    assert_eq!(summary.avg_size_kb, None);

    let store = ResultStore::new(
        results_dir.path(),
        Arc::new(FixedClock::new("20240101_000000")),
    );
    let path = store.persist(&results)?;
    assert_eq!(ResultStore::load(&path)?, ResultSet::new());
    Ok(())
}

// ==================== Concurrency Limit ====================

/// Fetcher that records peak in-flight requests.
///
/// Each request holds its slot across an async sleep, so the engine's worker
/// limit is the only thing bounding overlap.
struct InFlightFetcher {
    current: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Fetcher for InFlightFetcher {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchResponse, DownloadError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);

        Ok(FetchResponse {
            status: 200,
            content_type: Some("application/pdf".to_string()),
            body: url.as_bytes().to_vec(),
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_limit_bounds_in_flight_requests() -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Arc::new(InFlightFetcher {
        current: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let urls: Vec<String> = (0..10)
        .map(|i| format!("https://example.com/file{i}.pdf"))
        .collect();
    let output_dir = TempDir::new()?;

    let engine = DownloadEngine::new(3, Arc::clone(&fetcher) as Arc<dyn Fetcher>)?;
    let results = engine.run_all(&urls, output_dir.path()).await?;

    assert_eq!(results.successful().len(), 10);
    let observed_peak = fetcher.peak.load(Ordering::SeqCst);
    assert!(
        observed_peak <= 3,
        "Peak concurrency {observed_peak} should not exceed worker limit of 3"
    );
    assert_eq!(
        observed_peak, 3,
        "with more URLs than workers every slot should be used"
    );
    assert_eq!(file_count(output_dir.path()), 10);
    Ok(())
}

// ==================== Rerun ====================

#[tokio::test]
async fn test_rerun_overwrites_same_file() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/stable.pdf"))
        .respond_with(pdf_response(b"%PDF-1.4 stable content"))
        .mount(&mock_server)
        .await;

    let urls = vec![format!("{}/stable.pdf", mock_server.uri())];
    let output_dir = TempDir::new()?;
    let engine = engine(1)?;

    let first = engine.run_all(&urls, output_dir.path()).await?;
    let second = engine.run_all(&urls, output_dir.path()).await?;

    assert_eq!(
        first.successful()[0].filename(),
        second.successful()[0].filename()
    );
    assert_eq!(file_count(output_dir.path()), 1);
    Ok(())
}
