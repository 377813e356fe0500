//! Per-item download outcome records.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Synthetic code for connection-level failures (DNS, refused, reset).
pub const CODE_NETWORK_ERROR: i32 = -1;
/// Synthetic code for timed-out requests.
pub const CODE_TIMEOUT: i32 = -2;
/// Synthetic code for local filesystem failures.
pub const CODE_IO_ERROR: i32 = -3;
/// Synthetic code for resource URLs that do not parse.
pub const CODE_INVALID_URL: i32 = -4;
/// Synthetic code for success responses without a body.
pub const CODE_EMPTY_BODY: i32 = -5;
/// Synthetic code for transfers abandoned by batch cancellation.
pub const CODE_CANCELLED: i32 = -6;
/// Synthetic code for a worker that died without reporting.
pub const CODE_WORKER_PANICKED: i32 = -7;

/// Success/failure flag of a [`DownloadResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// The resource was written under the target directory.
    Success,
    /// The resource could not be retrieved or written.
    Failure,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// What happened to one resource.
///
/// Only the success variant carries a file path, so "failed results have no
/// file" holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DownloadOutcome {
    /// The resource body was streamed to `file`.
    Success {
        /// HTTP status of the final response.
        code: u16,
        /// Written file, always under the target directory.
        file: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// Retrieval failed after all attempts.
    Failure {
        /// Observed HTTP status or a negative synthetic code.
        code: i32,
        /// Human-readable cause.
        error: String,
    },
}

/// Outcome record for one attempted resource download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// The resource URL that was requested.
    pub url: String,
    /// The page URL the resource was discovered on.
    pub raw: String,
    /// Attempts made, including the first.
    pub attempts: u32,
    /// Success or failure details.
    #[serde(flatten)]
    pub outcome: DownloadOutcome,
}

impl DownloadResult {
    /// Creates a success record.
    #[must_use]
    pub fn success(
        url: impl Into<String>,
        raw: impl Into<String>,
        code: u16,
        file: PathBuf,
        bytes: u64,
    ) -> Self {
        Self {
            url: url.into(),
            raw: raw.into(),
            attempts: 1,
            outcome: DownloadOutcome::Success { code, file, bytes },
        }
    }

    /// Creates a failure record.
    #[must_use]
    pub fn failure(
        url: impl Into<String>,
        raw: impl Into<String>,
        code: i32,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            raw: raw.into(),
            attempts: 1,
            outcome: DownloadOutcome::Failure {
                code,
                error: error.into(),
            },
        }
    }

    /// Sets the attempt count.
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Returns the success/failure flag.
    #[must_use]
    pub fn status(&self) -> DownloadStatus {
        match self.outcome {
            DownloadOutcome::Success { .. } => DownloadStatus::Success,
            DownloadOutcome::Failure { .. } => DownloadStatus::Failure,
        }
    }

    /// Returns true on success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status() == DownloadStatus::Success
    }

    /// Returns the HTTP status or synthetic error code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match &self.outcome {
            DownloadOutcome::Success { code, .. } => i32::from(*code),
            DownloadOutcome::Failure { code, .. } => *code,
        }
    }

    /// Returns the written file path, present only on success.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        match &self.outcome {
            DownloadOutcome::Success { file, .. } => Some(file.as_path()),
            DownloadOutcome::Failure { .. } => None,
        }
    }

    /// Returns the failure cause, present only on failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            DownloadOutcome::Success { .. } => None,
            DownloadOutcome::Failure { error, .. } => Some(error.as_str()),
        }
    }
}
