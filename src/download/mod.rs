//! Resource retrieval: HTTP transport, naming, retry, and the worker pool.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Filename extraction from Content-Disposition headers
//! - Race-free duplicate handling (`name_1.pdf`, `name_2.pdf`, ...)
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Bounded retry with exponential backoff for transient failures
//! - Batch cancellation with partial-file cleanup
//!
//! # Example
//!
//! ```no_run
//! use edu_downloader::download::HttpClient;
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let saved = client
//!     .download_to_file(
//!         "https://example.com/lecture.pdf",
//!         Path::new("./downloads"),
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("Downloaded: {}", saved.path.display());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod filename;
mod result;
mod retry;

pub use client::{DownloadFileResult, HttpClient};
pub use engine::{
    DEFAULT_CONCURRENCY, DownloadEngine, EngineError, ResultObserver, validate_concurrency,
};
pub use error::DownloadError;
pub use result::{
    CODE_CANCELLED, CODE_EMPTY_BODY, CODE_INVALID_URL, CODE_IO_ERROR, CODE_NETWORK_ERROR,
    CODE_TIMEOUT, CODE_WORKER_PANICKED, DownloadOutcome, DownloadResult, DownloadStatus,
};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, FailureType, MAX_ATTEMPTS_LIMIT, RetryDecision, RetryPolicy,
    classify_error, run_with_retry,
};
