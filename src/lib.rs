//! Education Resource Downloader Library
//!
//! Resolves course page URLs into downloadable resource links (PDF, and
//! optionally MP3) and batch downloads them into a target directory,
//! reporting one outcome per resource.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Raw URL collection and index/range selection
//! - [`resolver`] - Raw URL to fetch configuration
//! - [`extract`] - Resource URL extraction from page data
//! - [`fetch`] - Concurrent page retrieval and resource mapping
//! - [`download`] - HTTP client, retry policy and download engine
//! - [`report`] - Batch summary over download results
//! - [`pipeline`] - End-to-end batch wiring

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod extract;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod resolver;
mod user_agent;

#[cfg(test)]
pub mod test_support;

// Re-export commonly used types
pub use download::{
    DEFAULT_CONCURRENCY, DownloadEngine, DownloadError, DownloadResult, DownloadStatus,
    EngineError, HttpClient, RetryPolicy,
};
pub use extract::{ExtractionError, SuffixSet, extract_resource_urls};
pub use fetch::{DataFetcher, FetchError, FetchOptions, FetchReport, PageSource, ResourceLink};
pub use parser::{ParseError, collect_urls, select_indices};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
pub use report::{BatchSummary, summarize};
pub use resolver::{FetchConfig, resolve_configs};
