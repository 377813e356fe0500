//! HTTP client wrapper for page-data requests and streaming downloads.
//!
//! One [`HttpClient`] is built per run and shared by every worker, so all
//! requests reuse the same connection pool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderName, USER_AGENT};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::filename::{choose_filename, create_unique_file};
use crate::user_agent;

/// HTTP client with streaming download support.
///
/// # Example
///
/// ```no_run
/// use edu_downloader::download::HttpClient;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let cancel = CancellationToken::new();
/// let saved = client
///     .download_to_file("https://example.com/notes.pdf", Path::new("./downloads"), &cancel)
///     .await?;
/// println!("saved {} bytes to {}", saved.bytes, saved.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// What a successful download produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFileResult {
    /// Written file, always inside the requested directory.
    pub path: PathBuf,
    /// Bytes written; never zero.
    pub bytes: u64,
    /// HTTP status of the response that was saved.
    pub status: u16,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with default timeouts.
    ///
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a client with explicit timeouts in seconds.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be
    /// initialized.
    pub fn new_with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Retrieves a page's raw data into memory.
    ///
    /// `timeout` bounds the whole request, body included; `None` leaves only
    /// the client-wide read timeout in force.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] for non-http(s) URLs,
    /// [`DownloadError::HttpStatus`] for non-2xx responses,
    /// [`DownloadError::Timeout`]/[`DownloadError::Network`] for transport
    /// failures, and [`DownloadError::Cancelled`] if `cancel` fires first.
    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn fetch_bytes(
        &self,
        url: &str,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DownloadError> {
        parse_http_url(url)?;

        let mut request = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent::default_fetch_user_agent());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let retrieval = async {
            let response = send_checked(request, url).await?;
            response
                .bytes()
                .await
                .map_err(|e| DownloadError::network(url, e))
        };

        let body = tokio::select! {
            () = cancel.cancelled() => return Err(DownloadError::cancelled(url)),
            body = retrieval => body?,
        };
        debug!(bytes = body.len(), "page data received");
        Ok(body.to_vec())
    }

    /// Downloads `url` into `output_dir` under a fresh, collision-free name.
    ///
    /// The filename is determined by:
    /// 1. Content-Disposition header (if present)
    /// 2. URL path (last segment)
    /// 3. Timestamp-based fallback
    ///
    /// The file is only created once a success response has arrived, and is
    /// removed again if streaming fails, the body turns out empty, or the
    /// batch is cancelled mid-transfer.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - The response body is empty
    /// - Writing to disk fails
    /// - `cancel` fires before the transfer completes
    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn download_to_file(
        &self,
        url: &str,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<DownloadFileResult, DownloadError> {
        let parsed_url = parse_http_url(url)?;

        let response = tokio::select! {
            () = cancel.cancelled() => return Err(DownloadError::cancelled(url)),
            response = send_checked(self.client.get(url), url) => response?,
        };
        let status = response.status().as_u16();

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = choose_filename(
            &parsed_url,
            header(CONTENT_DISPOSITION).as_deref(),
            header(CONTENT_TYPE).as_deref(),
        );

        let (mut file, file_path) = create_unique_file(output_dir, &filename)
            .await
            .map_err(|e| DownloadError::io(output_dir.join(&filename), e))?;
        debug!(path = %file_path.display(), "resolved output path");

        let outcome = match stream_to_file(&mut file, response, url, &file_path, cancel).await {
            Ok(0) => Err(DownloadError::empty_body(url)),
            other => other,
        };
        drop(file);

        match outcome {
            Ok(bytes) => {
                debug!(path = %file_path.display(), bytes, "download complete");
                Ok(DownloadFileResult {
                    path: file_path,
                    bytes,
                    status,
                })
            }
            Err(error) => {
                debug!(path = %file_path.display(), error = %error, "removing partial file");
                if let Err(e) = tokio::fs::remove_file(&file_path).await {
                    debug!(path = %file_path.display(), error = %e, "partial file cleanup failed");
                }
                Err(error)
            }
        }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn parse_http_url(url: &str) -> Result<Url, DownloadError> {
    Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .ok_or_else(|| DownloadError::invalid_url(url))
}

/// Sends the request and turns non-2xx statuses into errors.
async fn send_checked(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<reqwest::Response, DownloadError> {
    let response = request
        .send()
        .await
        .map_err(|e| DownloadError::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::http_status(url, status.as_u16()));
    }
    Ok(response)
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => return Err(DownloadError::cancelled(url)),
            next = stream.next() => next,
        };
        let Some(chunk_result) = next else { break };
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
