//! Error types for page-data retrieval.

use thiserror::Error;

use crate::download::DownloadError;
use crate::extract::ExtractionError;

/// Why one fetch config contributed no resources.
///
/// These never reach the caller of `DataFetcher::fetch_all`; they are logged
/// and counted at the config boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The page could not be retrieved.
    #[error("fetching {url} failed: {source}")]
    Transport {
        /// The page URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: DownloadError,
    },

    /// The page was retrieved but its data could not be scanned.
    #[error("extracting resources from {url} failed: {source}")]
    Extraction {
        /// The page URL.
        url: String,
        /// The underlying extraction error.
        #[source]
        source: ExtractionError,
    },

    /// The batch was cancelled before the page was processed.
    #[error("fetching {url} cancelled")]
    Cancelled {
        /// The page URL.
        url: String,
    },
}

impl FetchError {
    /// Wraps a transport error; cancellation keeps its own variant.
    pub fn transport(url: impl Into<String>, source: DownloadError) -> Self {
        if source.is_cancelled() {
            return Self::Cancelled { url: url.into() };
        }
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Wraps an extraction error.
    pub fn extraction(url: impl Into<String>, source: ExtractionError) -> Self {
        Self::Extraction {
            url: url.into(),
            source,
        }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Returns true if the batch was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_cancellation_maps_to_cancelled() {
        let error = FetchError::transport("https://x.test", DownloadError::cancelled("https://x.test"));
        assert!(error.is_cancelled());
    }

    #[test]
    fn test_transport_display_names_page() {
        let error = FetchError::transport("https://x.test/p", DownloadError::http_status("https://x.test/p", 404));
        let msg = error.to_string();
        assert!(msg.contains("https://x.test/p"), "{msg}");
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_extraction_display() {
        let error = FetchError::extraction("https://x.test/p", ExtractionError::NotUtf8 { offset: 3 });
        assert!(error.to_string().contains("extracting resources"));
    }
}
