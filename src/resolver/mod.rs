//! Fetch configuration resolution for raw input URLs.
//!
//! Turns the raw URL strings gathered by the parser into [`FetchConfig`]s,
//! one per usable `http`/`https` URL. Unusable entries (other schemes,
//! free text, URLs without a host) are dropped with a log line; they are
//! not errors. Repeated URLs stay repeated so each request is fetched and
//! reported on its own.
//!
//! # Example
//!
//! ```
//! use edu_downloader::resolver::resolve_configs;
//!
//! let raw = vec![
//!     "http://example.com/a".to_string(),
//!     "not-a-url".to_string(),
//!     "https://example.com/b".to_string(),
//! ];
//! let configs = resolve_configs(&raw, false);
//! assert_eq!(configs.len(), 2);
//! assert_eq!(configs[1].source_url(), "https://example.com/b");
//! ```

use tracing::{debug, instrument, warn};
use url::Url;

use crate::extract::SuffixSet;

/// A normalized page fetch request derived from one raw input URL.
///
/// Immutable once created; consumed by the data fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    source_url: String,
    wants_audio: bool,
}

impl FetchConfig {
    /// Creates a config for `source_url` if it is an absolute http(s) URL with a host.
    #[must_use]
    pub fn new(source_url: &str, wants_audio: bool) -> Option<Self> {
        let trimmed = source_url.trim();
        is_fetchable_url(trimmed).then(|| Self {
            source_url: trimmed.to_string(),
            wants_audio,
        })
    }

    /// The page URL to fetch, as the user supplied it.
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Whether audio resources should be extracted alongside documents.
    #[must_use]
    pub fn wants_audio(&self) -> bool {
        self.wants_audio
    }

    /// The suffix filter implied by this config.
    #[must_use]
    pub fn allowed_suffixes(&self) -> SuffixSet {
        SuffixSet::for_audio_flag(self.wants_audio)
    }
}

/// Returns true for absolute `http`/`https` URLs that have a host.
#[must_use]
pub fn is_fetchable_url(raw: &str) -> bool {
    Url::parse(raw)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// Resolves raw URLs into fetch configs, preserving order and duplicates.
#[instrument(skip(urls), fields(input = urls.len()))]
#[must_use]
pub fn resolve_configs(urls: &[String], wants_audio: bool) -> Vec<FetchConfig> {
    let configs: Vec<FetchConfig> = urls
        .iter()
        .filter_map(|raw| {
            let config = FetchConfig::new(raw, wants_audio);
            if config.is_none() {
                warn!(url = %raw, "skipping input that is not an http(s) URL");
            }
            config
        })
        .collect();

    debug!(
        accepted = configs.len(),
        dropped = urls.len() - configs.len(),
        "resolved fetch configs"
    );
    configs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_resolve_configs_drops_non_http() {
        let urls = strings(&[
            "http://example.com/a",
            "https://example.com/b",
            "not-a-url",
            "ftp://example.com/c",
            "file:///etc/passwd",
            "mailto:someone@example.com",
        ]);
        let configs = resolve_configs(&urls, false);
        let sources: Vec<&str> = configs.iter().map(FetchConfig::source_url).collect();
        assert_eq!(sources, vec!["http://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_resolve_configs_keeps_order_and_duplicates() {
        let urls = strings(&[
            "https://example.com/b",
            "https://example.com/a",
            "https://example.com/b",
        ]);
        let configs = resolve_configs(&urls, true);
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[0], configs[2]);
        assert!(configs.iter().all(FetchConfig::wants_audio));
    }

    #[test]
    fn test_resolve_configs_empty_input() {
        assert!(resolve_configs(&[], false).is_empty());
    }

    #[test]
    fn test_fetch_config_trims_source() {
        let config = FetchConfig::new("  https://example.com/x  ", false);
        assert_eq!(
            config.as_ref().map(FetchConfig::source_url),
            Some("https://example.com/x")
        );
    }

    #[test]
    fn test_fetch_config_suffixes_follow_audio_flag() {
        let docs = FetchConfig::new("https://example.com/x", false).map(|c| c.allowed_suffixes());
        assert_eq!(docs, Some(SuffixSet::documents()));

        let audio = FetchConfig::new("https://example.com/x", true).map(|c| c.allowed_suffixes());
        assert!(audio.is_some_and(|s| s.contains("mp3") && s.contains("pdf")));
    }

    #[test]
    fn test_is_fetchable_url_requires_host() {
        assert!(is_fetchable_url("https://example.com"));
        assert!(!is_fetchable_url("http://"));
        assert!(!is_fetchable_url("/relative/path"));
        assert!(!is_fetchable_url(""));
    }
}
