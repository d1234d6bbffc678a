//! HTTP capability used by download tasks.
//!
//! Tasks only depend on the [`Fetcher`] trait: one GET with a timeout,
//! returning status, content type and the full body. [`HttpClient`] is the
//! `reqwest` implementation used by the binary; tests substitute their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use super::constants::REQUEST_TIMEOUT_SECS;
use super::error::DownloadError;
use crate::user_agent;

/// A fully buffered successful (2xx) response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Content-Type` header value, if the server sent one.
    pub content_type: Option<String>,
    /// The complete response body.
    pub body: Vec<u8>,
}

/// Issues a single GET request and buffers the body.
///
/// Implementations must map non-2xx responses to
/// [`DownloadError::HttpStatus`] and transport failures to
/// [`DownloadError::Network`] / [`DownloadError::Timeout`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up after `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchResponse, DownloadError>;
}

/// `reqwest`-backed [`Fetcher`].
///
/// Create once and share; clones reuse the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with the default connect timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::try_new().expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client, returning the builder error instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` builder error (e.g. TLS backend initialisation failure).
    pub fn try_new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchResponse, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(url, e))?
            .to_vec();

        debug!(
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or(""),
            bytes = body.len(),
            "response buffered"
        );

        Ok(FetchResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn map_transport_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::network(url, error)
    }
}
