//! Error types for resource extraction.

use thiserror::Error;

/// Errors raised when fetched page data cannot be scanned for resources.
///
/// Extraction errors are local to one page; the data fetcher logs them and
/// treats the page as contributing no resources.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Page data is not valid UTF-8 text.
    #[error("page data is not valid UTF-8 (first bad byte at offset {offset})")]
    NotUtf8 {
        /// Byte offset of the first invalid sequence.
        offset: usize,
    },

    /// Page data looks like JSON but does not parse.
    #[error("page data is malformed JSON: {source}")]
    MalformedJson {
        /// The underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionError {
    /// Creates a UTF-8 decoding error.
    #[must_use]
    pub fn not_utf8(error: &std::str::Utf8Error) -> Self {
        Self::NotUtf8 {
            offset: error.valid_up_to(),
        }
    }

    /// Creates a malformed JSON error.
    #[must_use]
    pub fn malformed_json(source: serde_json::Error) -> Self {
        Self::MalformedJson { source }
    }
}
