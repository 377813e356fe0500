//! Constants for the download module (timeouts, worker pool bounds).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default timeout for a single page-data request (30 seconds).
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Minimum allowed worker pool size.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed worker pool size.
pub const MAX_CONCURRENCY: usize = 32;

/// Highest numeric disambiguator tried before falling back to a timestamp name.
pub(crate) const MAX_NAME_SUFFIX: usize = 999;

/// Longest derived file name in bytes, leaving room for `_N` or a timestamp
/// under the common 255-byte filesystem limit.
pub(crate) const MAX_FILENAME_BYTES: usize = 200;

/// Longest extension kept when a name is shortened.
pub(crate) const MAX_EXTENSION_BYTES: usize = 16;
