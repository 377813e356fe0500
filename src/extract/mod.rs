//! Resource link extraction from fetched page data.
//!
//! Page data is either a JSON document (the platform's resource detail
//! payloads) or HTML/plain text. Every embedded `http`/`https` URL is
//! collected and kept only when its file-type suffix is in the caller's
//! [`SuffixSet`].
//!
//! # Example
//!
//! ```
//! use edu_downloader::extract::{SuffixSet, extract_resource_urls};
//!
//! let page = br#"{"items":[{"url":"https://cdn.example/book.pdf"},{"url":"https://cdn.example/cover.jpg"}]}"#;
//! let found = extract_resource_urls(page, &SuffixSet::documents()).unwrap();
//! assert!(found.contains("https://cdn.example/book.pdf"));
//! assert_eq!(found.len(), 1);
//! ```

mod error;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

pub use error::ExtractionError;

/// Suffix of the primary document type, always accepted.
pub const DOCUMENT_SUFFIX: &str = "pdf";

/// Suffix of the audio type, accepted only when audio was requested.
pub const AUDIO_SUFFIX: &str = "mp3";

/// Longest extension still treated as a file-type suffix.
const MAX_SUFFIX_LEN: usize = 8;

#[allow(clippy::expect_used)]
static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Stops at whitespace, markup delimiters, quotes, backslashes and closing
    // brackets so links embedded in HTML attributes, escaped JSON text or
    // script literals are cut cleanly.
    Regex::new(r#"https?://[^\s<>"'\\\]}]+"#).expect("link regex is valid") // Static pattern, safe to panic
});

/// The set of lower-cased file-type suffixes a caller is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixSet {
    suffixes: BTreeSet<String>,
}

impl SuffixSet {
    /// Builds a set from arbitrary suffixes (leading dots are ignored).
    #[must_use]
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Documents only.
    #[must_use]
    pub fn documents() -> Self {
        Self::new([DOCUMENT_SUFFIX])
    }

    /// The suffix filter implied by a `wants_audio` flag.
    #[must_use]
    pub fn for_audio_flag(wants_audio: bool) -> Self {
        if wants_audio {
            Self::new([DOCUMENT_SUFFIX, AUDIO_SUFFIX])
        } else {
            Self::documents()
        }
    }

    /// Returns true if `suffix` (case-insensitive) is accepted.
    #[must_use]
    pub fn contains(&self, suffix: &str) -> bool {
        self.suffixes.contains(&suffix.to_lowercase())
    }

    /// Iterates over the accepted suffixes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }
}

impl fmt::Display for SuffixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

/// Returns the lower-cased file-type suffix of a URL's last path segment.
///
/// # Examples
///
/// ```
/// use edu_downloader::extract::url_suffix;
///
/// assert_eq!(url_suffix("https://cdn.example/a/Book.PDF?sig=1"), Some("pdf".to_string()));
/// assert_eq!(url_suffix("https://cdn.example/a/"), None);
/// ```
#[must_use]
pub fn url_suffix(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > MAX_SUFFIX_LEN || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Scans page data for embedded resource URLs whose suffix is allowed.
///
/// Data whose trimmed text starts with `{` or `[` is parsed as JSON and every
/// string value is scanned; anything else is scanned as HTML/plain text.
/// Well-formed data without matching links yields an empty set.
///
/// # Errors
///
/// Returns [`ExtractionError::NotUtf8`] for non-UTF-8 data and
/// [`ExtractionError::MalformedJson`] for JSON-looking data that fails to parse.
pub fn extract_resource_urls(
    page_data: &[u8],
    allowed_suffixes: &SuffixSet,
) -> Result<BTreeSet<String>, ExtractionError> {
    let text = std::str::from_utf8(page_data).map_err(|e| ExtractionError::not_utf8(&e))?;
    let trimmed = text.trim_start_matches('\u{feff}').trim();

    let mut found = BTreeSet::new();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let document: Value = serde_json::from_str(trimmed).map_err(ExtractionError::malformed_json)?;
        let mut pending = vec![&document];
        while let Some(value) = pending.pop() {
            match value {
                Value::String(s) => scan_text(s, allowed_suffixes, &mut found),
                Value::Array(items) => pending.extend(items.iter()),
                Value::Object(map) => pending.extend(map.values()),
                Value::Null | Value::Bool(_) | Value::Number(_) => {}
            }
        }
    } else {
        let unescaped = trimmed.replace("\\/", "/");
        scan_text(&unescaped, allowed_suffixes, &mut found);
    }

    debug!(
        matches = found.len(),
        suffixes = %allowed_suffixes,
        "extracted resource links"
    );
    Ok(found)
}

fn scan_text(text: &str, allowed_suffixes: &SuffixSet, found: &mut BTreeSet<String>) {
    for candidate in LINK_PATTERN.find_iter(text) {
        let cleaned = clean_link_trailing(candidate.as_str()).replace("&amp;", "&");
        let Some(normalized) = validate_link(&cleaned) else {
            trace!(link = %cleaned, "skipping unparseable link");
            continue;
        };
        match url_suffix(&normalized) {
            Some(suffix) if allowed_suffixes.contains(&suffix) => {
                trace!(link = %normalized, %suffix, "matched resource link");
                found.insert(normalized);
            }
            _ => {}
        }
    }
}

/// Strips punctuation that commonly trails links embedded in prose.
fn clean_link_trailing(link: &str) -> &str {
    let mut result = link;
    while let Some(last) = result.chars().last() {
        match last {
            '.' | ',' | ';' | ':' | '!' | '?' => result = &result[..result.len() - 1],
            ')' => {
                let open = result.chars().filter(|&c| c == '(').count();
                let close = result.chars().filter(|&c| c == ')').count();
                if close > open {
                    result = &result[..result.len() - 1];
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    result
}

/// Returns the normalized form of an absolute http(s) URL with a host.
fn validate_link(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return None;
    }
    Some(parsed.to_string())
}
