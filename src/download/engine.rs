//! Concurrent resource downloads with bounded retry.
//!
//! [`DownloadEngine::download_all`] turns every presented [`ResourceLink`]
//! into exactly one [`DownloadResult`], whatever happens to the transfer:
//! transport failures, panicking workers, and batch cancellation all become
//! failure records instead of silent drops.
//!
//! # Example
//!
//! ```no_run
//! use edu_downloader::download::{DownloadEngine, HttpClient, RetryPolicy};
//! use edu_downloader::fetch::ResourceLink;
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(6, RetryPolicy::default())?;
//! let links = vec![ResourceLink::new(
//!     "https://example.com/notes.pdf",
//!     "https://example.com/course",
//!     "pdf",
//! )];
//! let results = engine
//!     .download_all(&links, Path::new("./downloads"), &HttpClient::new(), &CancellationToken::new())
//!     .await?;
//! assert_eq!(results.len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::result::{CODE_CANCELLED, CODE_WORKER_PANICKED, DownloadResult};
use super::retry::{RetryPolicy, run_with_retry};
use super::{DownloadError, HttpClient};
use crate::fetch::ResourceLink;

/// Default number of concurrent downloads.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Callback invoked once per finished item, in completion order.
pub type ResultObserver = Arc<dyn Fn(&DownloadResult) + Send + Sync>;

/// Batch-level failures of the download engine.
///
/// Per-item problems never show up here; they become failed
/// [`DownloadResult`]s.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The target directory could not be created or used.
    #[error("cannot prepare target directory {path}: {source}")]
    Configuration {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Validates a worker pool size against the supported range.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConcurrency`] outside `1..=32`.
pub fn validate_concurrency(value: usize) -> Result<usize, EngineError> {
    if (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::InvalidConcurrency { value })
    }
}

/// Download engine for concurrent file downloads with retry support.
///
/// # Concurrency Model
///
/// - Each download runs in its own Tokio task inside a `JoinSet`
/// - A semaphore permit is acquired before spawning each download
/// - Permits are released automatically when downloads complete (RAII)
/// - Results are collected in completion order
pub struct DownloadEngine {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    retry_policy: RetryPolicy,
    observer: Option<ResultObserver>,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("concurrency", &self.concurrency)
            .field("retry_policy", &self.retry_policy)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates an engine with `concurrency` workers (1-32).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range.
    ///
    /// # Example
    ///
    /// ```
    /// use edu_downloader::download::{DownloadEngine, RetryPolicy};
    ///
    /// assert!(DownloadEngine::new(6, RetryPolicy::default()).is_ok());
    /// assert!(DownloadEngine::new(0, RetryPolicy::default()).is_err());
    /// ```
    #[instrument(level = "debug", skip(retry_policy))]
    pub fn new(concurrency: usize, retry_policy: RetryPolicy) -> Result<Self, EngineError> {
        let concurrency = validate_concurrency(concurrency)?;
        debug!(
            concurrency,
            max_attempts = retry_policy.max_attempts(),
            "creating download engine"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            retry_policy,
            observer: None,
        })
    }

    /// Registers a callback that sees every result as it completes.
    #[must_use]
    pub fn with_observer(mut self, observer: ResultObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Downloads every link into `target_dir`, one result per link.
    ///
    /// `target_dir` (and its parents) is created before any transfer starts.
    /// Results come back in completion order. Once `cancel` fires, in-flight
    /// transfers stop, their partial files are removed, and every link not
    /// yet finished is reported as a failure with code `-6`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if `target_dir` cannot be
    /// created, and [`EngineError::SemaphoreClosed`] if the worker pool
    /// is torn down underneath the batch. Individual download failures do
    /// NOT cause this method to error.
    #[instrument(skip(self, links, client, cancel), fields(links = links.len(), target_dir = %target_dir.display()))]
    pub async fn download_all(
        &self,
        links: &[ResourceLink],
        target_dir: &Path,
        client: &HttpClient,
        cancel: &CancellationToken,
    ) -> Result<Vec<DownloadResult>, EngineError> {
        tokio::fs::create_dir_all(target_dir)
            .await
            .map_err(|source| EngineError::Configuration {
                path: target_dir.to_path_buf(),
                source,
            })?;

        info!("starting downloads");
        let mut results = Vec::with_capacity(links.len());
        let mut in_flight: HashMap<Id, ResourceLink> = HashMap::new();
        let mut tasks = JoinSet::new();

        for link in links {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = Arc::clone(&self.semaphore).acquire_owned() => {
                    Some(permit.map_err(|_| EngineError::SemaphoreClosed)?)
                }
            };

            let Some(permit) = permit else {
                self.record(&mut results, cancelled_result(link));
                continue;
            };

            let client = client.clone();
            let worker_link = link.clone();
            let target_dir = target_dir.to_path_buf();
            let retry_policy = self.retry_policy.clone();
            let cancel = cancel.clone();

            let handle = tasks.spawn(async move {
                let _permit = permit;
                download_one(&client, &worker_link, &target_dir, &retry_policy, &cancel).await
            });
            in_flight.insert(handle.id(), link.clone());

            while let Some(joined) = tasks.try_join_next_with_id() {
                if let Some(result) = settle(joined, &mut in_flight) {
                    self.record(&mut results, result);
                }
            }
        }

        debug!(in_flight = tasks.len(), "waiting for downloads to complete");
        while let Some(joined) = tasks.join_next_with_id().await {
            if let Some(result) = settle(joined, &mut in_flight) {
                self.record(&mut results, result);
            }
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!(
            succeeded,
            failed = results.len() - succeeded,
            total = results.len(),
            "downloads complete"
        );
        Ok(results)
    }

    fn record(&self, results: &mut Vec<DownloadResult>, result: DownloadResult) {
        if let Some(observer) = &self.observer {
            observer(&result);
        }
        results.push(result);
    }
}

/// Downloads one link with retry, always producing a record.
#[instrument(skip_all, fields(url = %link.resource_url))]
async fn download_one(
    client: &HttpClient,
    link: &ResourceLink,
    target_dir: &Path,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> DownloadResult {
    let url = link.resource_url.as_str();
    let (outcome, attempts) = run_with_retry(policy, cancel, url, move || {
        client.download_to_file(url, target_dir, cancel)
    })
    .await;

    match outcome {
        Ok(saved) => {
            debug!(path = %saved.path.display(), bytes = saved.bytes, attempts, "download completed");
            DownloadResult::success(url, &link.origin_url, saved.status, saved.path, saved.bytes)
                .with_attempts(attempts)
        }
        Err(error) => {
            warn!(error = %error, attempts, "download failed");
            failure_from_error(link, &error).with_attempts(attempts)
        }
    }
}

fn failure_from_error(link: &ResourceLink, error: &DownloadError) -> DownloadResult {
    DownloadResult::failure(
        &link.resource_url,
        &link.origin_url,
        error.code(),
        error.to_string(),
    )
}

fn cancelled_result(link: &ResourceLink) -> DownloadResult {
    failure_from_error(link, &DownloadError::cancelled(&link.resource_url)).with_attempts(0)
}

/// Turns a finished task into its record, synthesizing one for dead workers.
fn settle(
    joined: Result<(Id, DownloadResult), JoinError>,
    in_flight: &mut HashMap<Id, ResourceLink>,
) -> Option<DownloadResult> {
    match joined {
        Ok((id, result)) => {
            in_flight.remove(&id);
            Some(result)
        }
        Err(join_error) => {
            let Some(link) = in_flight.remove(&join_error.id()) else {
                warn!(error = %join_error, "finished task has no tracked link");
                return None;
            };
            let code = if join_error.is_cancelled() {
                CODE_CANCELLED
            } else {
                CODE_WORKER_PANICKED
            };
            warn!(url = %link.resource_url, error = %join_error, "download worker did not report");
            Some(DownloadResult::failure(
                link.resource_url,
                link.origin_url,
                code,
                format!("download worker failed: {join_error}"),
            ))
        }
    }
}
