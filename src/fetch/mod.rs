//! Page retrieval and resource discovery.
//!
//! The [`DataFetcher`] retrieves the page behind every [`FetchConfig`],
//! runs an extraction function over the data, and merges the discovered
//! resources into one mapping keyed by resource URL.
//!
//! A failing page (transport error, unparseable data) contributes nothing
//! and is counted in [`FetchReport::pages_failed`]; it never stops sibling
//! pages. When several pages name the same resource, the page that comes
//! later in the config order wins, independent of which fetch finished first.

mod error;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub use error::FetchError;

use crate::download::constants::FETCH_TIMEOUT_SECS;
use crate::download::{
    DownloadError, EngineError, HttpClient, RetryPolicy, run_with_retry, validate_concurrency,
};
use crate::extract::{ExtractionError, SuffixSet, extract_resource_urls, url_suffix};
use crate::resolver::{FetchConfig, is_fetchable_url};

/// Default number of pages fetched at once.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Scans page data for resource URLs matching a suffix filter.
pub type ExtractFn =
    Arc<dyn Fn(&[u8], &SuffixSet) -> Result<BTreeSet<String>, ExtractionError> + Send + Sync>;

/// The built-in extraction function, [`extract_resource_urls`].
#[must_use]
pub fn default_extractor() -> ExtractFn {
    Arc::new(extract_resource_urls)
}

/// A downloadable resource and the page it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceLink {
    /// Absolute http(s) URL of the resource.
    pub resource_url: String,
    /// Source URL of the fetch config that yielded it.
    pub origin_url: String,
    /// Lower-cased file-type suffix (`pdf`, `mp3`, ...).
    pub suffix: String,
}

impl ResourceLink {
    /// Creates a link record.
    pub fn new(
        resource_url: impl Into<String>,
        origin_url: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            resource_url: resource_url.into(),
            origin_url: origin_url.into(),
            suffix: suffix.into(),
        }
    }
}

/// Where page data comes from.
///
/// Implemented by [`HttpClient`]; tests substitute in-memory sources.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieves the raw data behind `url`.
    async fn fetch_page(
        &self,
        url: &str,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DownloadError>;
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(
        &self,
        url: &str,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DownloadError> {
        self.fetch_bytes(url, timeout, cancel).await
    }
}

/// Tuning for the data fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Pages fetched at once (1-32).
    pub concurrency: usize,
    /// Per-request timeout for page data.
    pub timeout: Duration,
    /// Retry policy for transient page failures.
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Merged output of one fetch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Discovered resources keyed by resource URL.
    pub resources: HashMap<String, ResourceLink>,
    /// Configs whose page was retrieved and scanned.
    pub pages_ok: usize,
    /// Configs that contributed nothing because of an error or cancellation.
    pub pages_failed: usize,
}

impl FetchReport {
    /// The discovered links, sorted by resource URL.
    #[must_use]
    pub fn links(&self) -> Vec<ResourceLink> {
        let mut links: Vec<ResourceLink> = self.resources.values().cloned().collect();
        links.sort_by(|a, b| a.resource_url.cmp(&b.resource_url));
        links
    }
}

/// Concurrent page fetcher.
pub struct DataFetcher {
    source: Arc<dyn PageSource>,
    options: FetchOptions,
}

impl std::fmt::Debug for DataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFetcher")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

type PageOutcome = (usize, Result<BTreeSet<String>, FetchError>);

impl DataFetcher {
    /// Creates a fetcher over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if
    /// `options.concurrency` is outside `1..=32`.
    pub fn new(source: Arc<dyn PageSource>, options: FetchOptions) -> Result<Self, EngineError> {
        validate_concurrency(options.concurrency)?;
        Ok(Self { source, options })
    }

    /// Fetches every config's page and merges the extracted resources.
    ///
    /// Failures are isolated per config and never raised. Pages not started
    /// before `cancel` fires count as failed.
    #[instrument(skip(self, configs, extract, cancel), fields(configs = configs.len()))]
    pub async fn fetch_all(
        &self,
        configs: &[FetchConfig],
        extract: ExtractFn,
        cancel: &CancellationToken,
    ) -> FetchReport {
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency));
        let mut tasks: JoinSet<PageOutcome> = JoinSet::new();
        let mut per_config: Vec<Option<BTreeSet<String>>> = vec![None; configs.len()];

        for (index, config) in configs.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                debug!(url = config.source_url(), "page skipped after cancellation");
                continue;
            };

            let source = Arc::clone(&self.source);
            let extract = Arc::clone(&extract);
            let config = config.clone();
            let options = self.options.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = fetch_one(source.as_ref(), &config, &extract, &options, &cancel).await;
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(urls))) => per_config[index] = Some(urls),
                Ok((index, Err(error))) => {
                    warn!(url = configs[index].source_url(), error = %error, "page contributed no resources");
                }
                Err(join_error) => warn!(error = %join_error, "page worker did not report"),
            }
        }

        let mut report = FetchReport::default();
        for (config, found) in configs.iter().zip(per_config) {
            let Some(urls) = found else {
                report.pages_failed += 1;
                continue;
            };
            report.pages_ok += 1;
            for url in urls {
                if !is_fetchable_url(&url) {
                    warn!(url = %url, page = config.source_url(), "dropping non-http resource link");
                    continue;
                }
                let suffix = url_suffix(&url).unwrap_or_default();
                let link = ResourceLink::new(url.clone(), config.source_url(), suffix);
                report.resources.insert(url, link);
            }
        }

        info!(
            resources = report.resources.len(),
            pages_ok = report.pages_ok,
            pages_failed = report.pages_failed,
            "page fetch complete"
        );
        report
    }
}

#[instrument(skip_all, fields(url = config.source_url()))]
async fn fetch_one(
    source: &dyn PageSource,
    config: &FetchConfig,
    extract: &ExtractFn,
    options: &FetchOptions,
    cancel: &CancellationToken,
) -> Result<BTreeSet<String>, FetchError> {
    let url = config.source_url();
    if cancel.is_cancelled() {
        return Err(FetchError::cancelled(url));
    }

    let timeout = Some(options.timeout);
    let (data, attempts) = run_with_retry(&options.retry, cancel, url, move || {
        source.fetch_page(url, timeout, cancel)
    })
    .await;
    let data = data.map_err(|e| FetchError::transport(url, e))?;

    let found =
        extract(&data, &config.allowed_suffixes()).map_err(|e| FetchError::extraction(url, e))?;
    debug!(attempts, bytes = data.len(), resources = found.len(), "page scanned");
    Ok(found)
}
