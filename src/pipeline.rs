//! End-to-end batch: resolve, fetch, download, summarize.
//!
//! ```no_run
//! use edu_downloader::download::HttpClient;
//! use edu_downloader::pipeline::{Pipeline, PipelineOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(HttpClient::new(), PipelineOptions::default())?;
//! let urls = vec!["https://example.com/course/42".to_string()];
//! let report = pipeline.run(&urls, &CancellationToken::new()).await?;
//! println!("{} of {} saved", report.summary.succeeded, report.summary.total);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::download::{
    DEFAULT_CONCURRENCY, DownloadEngine, DownloadResult, EngineError, HttpClient, ResultObserver,
    RetryPolicy,
};
use crate::fetch::{
    DataFetcher, ExtractFn, FetchOptions, FetchReport, PageSource, ResourceLink, default_extractor,
};
use crate::report::{BatchSummary, summarize};
use crate::resolver::resolve_configs;

/// Default target directory.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Everything a batch needs to know up front.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory resources are written to; created if absent.
    pub target_dir: PathBuf,
    /// Also collect audio resources.
    pub wants_audio: bool,
    /// Page fetch tuning.
    pub fetch: FetchOptions,
    /// Concurrent resource downloads.
    pub download_concurrency: usize,
    /// Retry policy for resource downloads.
    pub download_retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            wants_audio: false,
            fetch: FetchOptions::default(),
            download_concurrency: DEFAULT_CONCURRENCY,
            download_retry: RetryPolicy::default(),
        }
    }
}

/// Output of the discovery stage.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Raw inputs received.
    pub inputs: usize,
    /// Inputs that became fetch configs.
    pub configs: usize,
    /// Merged fetch output.
    pub fetch: FetchReport,
}

impl Discovery {
    /// Resource links to download, sorted by URL.
    #[must_use]
    pub fn links(&self) -> Vec<ResourceLink> {
        self.fetch.links()
    }
}

/// Everything a presentation layer needs after a batch.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Raw inputs received.
    pub inputs: usize,
    /// Inputs accepted as http(s) page URLs.
    pub configs: usize,
    /// Pages retrieved and scanned.
    pub pages_ok: usize,
    /// Pages that contributed nothing.
    pub pages_failed: usize,
    /// One record per discovered resource, in completion order.
    pub results: Vec<DownloadResult>,
    /// Counts and elapsed time.
    pub summary: BatchSummary,
    /// True if the batch was interrupted.
    pub cancelled: bool,
}

impl PipelineReport {
    /// Combines stage outputs into a report.
    #[must_use]
    pub fn assemble(
        discovery: &Discovery,
        results: Vec<DownloadResult>,
        elapsed: Duration,
        cancelled: bool,
    ) -> Self {
        let summary = summarize(&results, elapsed);
        Self {
            inputs: discovery.inputs,
            configs: discovery.configs,
            pages_ok: discovery.fetch.pages_ok,
            pages_failed: discovery.fetch.pages_failed,
            results,
            summary,
            cancelled,
        }
    }
}

/// The configured batch pipeline.
pub struct Pipeline {
    client: HttpClient,
    fetcher: DataFetcher,
    engine: DownloadEngine,
    extractor: ExtractFn,
    options: PipelineOptions,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("fetcher", &self.fetcher)
            .field("engine", &self.engine)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Builds a pipeline that fetches pages and resources through `client`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] for out-of-range worker
    /// pool sizes.
    pub fn new(client: HttpClient, options: PipelineOptions) -> Result<Self, EngineError> {
        let source: Arc<dyn PageSource> = Arc::new(client.clone());
        Self::with_page_source(client, source, options)
    }

    /// Builds a pipeline that reads page data from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] for out-of-range worker
    /// pool sizes.
    pub fn with_page_source(
        client: HttpClient,
        source: Arc<dyn PageSource>,
        options: PipelineOptions,
    ) -> Result<Self, EngineError> {
        let fetcher = DataFetcher::new(source, options.fetch.clone())?;
        let engine = DownloadEngine::new(options.download_concurrency, options.download_retry.clone())?;
        Ok(Self {
            client,
            fetcher,
            engine,
            extractor: default_extractor(),
            options,
        })
    }

    /// Reports every download result as it completes.
    #[must_use]
    pub fn with_observer(mut self, observer: ResultObserver) -> Self {
        self.engine = self.engine.with_observer(observer);
        self
    }

    /// Replaces the extraction function.
    #[must_use]
    pub fn with_extractor(mut self, extractor: ExtractFn) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns the options the pipeline was built with.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Resolves raw URLs and fetches their pages.
    #[instrument(skip(self, raw_urls, cancel), fields(inputs = raw_urls.len()))]
    pub async fn discover(&self, raw_urls: &[String], cancel: &CancellationToken) -> Discovery {
        let configs = resolve_configs(raw_urls, self.options.wants_audio);
        let fetch = self
            .fetcher
            .fetch_all(&configs, Arc::clone(&self.extractor), cancel)
            .await;
        Discovery {
            inputs: raw_urls.len(),
            configs: configs.len(),
            fetch,
        }
    }

    /// Downloads `links` into the target directory.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if the target directory cannot
    /// be created.
    pub async fn download(
        &self,
        links: &[ResourceLink],
        cancel: &CancellationToken,
    ) -> Result<Vec<DownloadResult>, EngineError> {
        self.engine
            .download_all(links, &self.options.target_dir, &self.client, cancel)
            .await
    }

    /// Runs the whole batch.
    ///
    /// # Errors
    ///
    /// Only structural failures surface here, chiefly an unusable target
    /// directory; per-item failures are part of the report.
    #[instrument(skip(self, raw_urls, cancel), fields(inputs = raw_urls.len(), target_dir = %self.options.target_dir.display()))]
    pub async fn run(
        &self,
        raw_urls: &[String],
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, EngineError> {
        let started = Instant::now();
        let discovery = self.discover(raw_urls, cancel).await;
        let results = self.download(&discovery.links(), cancel).await?;
        let report =
            PipelineReport::assemble(&discovery, results, started.elapsed(), cancel.is_cancelled());

        info!(
            total = report.summary.total,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            cancelled = report.cancelled,
            "batch finished"
        );
        Ok(report)
    }
}
