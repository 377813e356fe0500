//! Error types for the download module.
//!
//! This module defines structured errors for all transport operations,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

use super::result::{
    CODE_CANCELLED, CODE_EMPTY_BODY, CODE_INVALID_URL, CODE_IO_ERROR, CODE_NETWORK_ERROR,
    CODE_TIMEOUT,
};

/// Errors that can occur while retrieving page data or resource files.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The server answered with a success status but sent no bytes.
    #[error("empty response body downloading {url}")]
    EmptyBody {
        /// The URL that returned nothing.
        url: String,
    },

    /// The batch was cancelled while this transfer was pending or in flight.
    #[error("download cancelled: {url}")]
    Cancelled {
        /// The URL whose transfer was abandoned.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    ///
    /// Timeouts reported by reqwest are mapped to [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an empty body error.
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Returns the integer code recorded in a failed download result.
    ///
    /// HTTP failures report the observed status; everything else reports a
    /// negative synthetic code.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::HttpStatus { status, .. } => i32::from(*status),
            Self::Network { .. } => CODE_NETWORK_ERROR,
            Self::Timeout { .. } => CODE_TIMEOUT,
            Self::Io { .. } => CODE_IO_ERROR,
            Self::InvalidUrl { .. } => CODE_INVALID_URL,
            Self::EmptyBody { .. } => CODE_EMPTY_BODY,
            Self::Cancelled { .. } => CODE_CANCELLED,
        }
    }

    /// Returns true if this error was caused by batch cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the
// url or path, which the source errors don't carry.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.com/file.pdf");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/file.pdf"));
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://example.com/file.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/file.pdf"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/test.pdf"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/test.pdf"), "Expected path in: {msg}");
    }

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_download_error_codes() {
        assert_eq!(DownloadError::http_status("u", 404).code(), 404);
        assert_eq!(DownloadError::http_status("u", 503).code(), 503);
        assert_eq!(DownloadError::timeout("u").code(), CODE_TIMEOUT);
        assert_eq!(DownloadError::invalid_url("u").code(), CODE_INVALID_URL);
        assert_eq!(DownloadError::empty_body("u").code(), CODE_EMPTY_BODY);
        assert_eq!(DownloadError::cancelled("u").code(), CODE_CANCELLED);
        let io = DownloadError::io("/x", std::io::Error::other("boom"));
        assert_eq!(io.code(), CODE_IO_ERROR);
    }

    #[test]
    fn test_synthetic_codes_are_negative_and_distinct() {
        let codes = [
            CODE_NETWORK_ERROR,
            CODE_TIMEOUT,
            CODE_IO_ERROR,
            CODE_INVALID_URL,
            CODE_EMPTY_BODY,
            CODE_CANCELLED,
        ];
        assert!(codes.iter().all(|c| *c < 0));
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_is_cancelled() {
        assert!(DownloadError::cancelled("u").is_cancelled());
        assert!(!DownloadError::timeout("u").is_cancelled());
    }
}
