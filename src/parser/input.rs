//! Raw URL collection from list files and inline comma-separated strings.

use std::fs;
use std::path::Path;

use tracing::{debug, error};

/// Splits a comma-separated URL string into trimmed, non-empty tokens.
///
/// # Examples
///
/// ```
/// use edu_downloader::parser::split_url_list;
///
/// let urls = split_url_list(" https://a.example/x , ,https://b.example/y");
/// assert_eq!(urls, vec!["https://a.example/x", "https://b.example/y"]);
/// ```
#[must_use]
pub fn split_url_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads a URL list file into its lines.
///
/// Read failures are logged and yield no lines; a broken list file never
/// aborts URL collection from other sources.
#[must_use]
pub fn read_url_list(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(contents) => contents.lines().map(str::to_string).collect(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read URL list file");
            Vec::new()
        }
    }
}

/// Collects candidate URLs from optional file lines and an optional inline list.
///
/// Each file line may itself hold several comma-separated URLs. Tokens are
/// trimmed and empty ones dropped. Encounter order is preserved (file lines
/// first, then the inline list) and duplicates are kept.
#[must_use]
pub fn collect_urls(file_lines: Option<&[String]>, inline_list: Option<&str>) -> Vec<String> {
    let mut urls: Vec<String> = file_lines
        .unwrap_or_default()
        .iter()
        .flat_map(|line| split_url_list(line))
        .collect();

    if let Some(inline) = inline_list {
        urls.extend(split_url_list(inline));
    }

    debug!(count = urls.len(), "collected raw URLs");
    urls
}

/// Collects candidate URLs, reading the line-oriented source from `list_file`.
#[must_use]
pub fn collect_urls_from_file(list_file: Option<&Path>, inline_list: Option<&str>) -> Vec<String> {
    let lines = list_file.map(read_url_list);
    collect_urls(lines.as_deref(), inline_list)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_split_url_list_trims_and_drops_empty() {
        assert_eq!(
            split_url_list("a, b ,,c,"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(split_url_list("  , ,").is_empty());
    }

    #[test]
    fn test_collect_urls_inline_only() {
        let urls = collect_urls(None, Some("http://x.test/1,http://x.test/2"));
        assert_eq!(urls, vec!["http://x.test/1", "http://x.test/2"]);
    }

    #[test]
    fn test_collect_urls_file_lines_before_inline() {
        let lines = vec![
            "http://f.test/1, http://f.test/2".to_string(),
            String::new(),
            "   ".to_string(),
            "http://f.test/3".to_string(),
        ];
        let urls = collect_urls(Some(&lines), Some("http://i.test/1"));
        assert_eq!(
            urls,
            vec![
                "http://f.test/1",
                "http://f.test/2",
                "http://f.test/3",
                "http://i.test/1"
            ]
        );
    }

    #[test]
    fn test_collect_urls_keeps_duplicates() {
        let urls = collect_urls(None, Some("http://d.test/a,http://d.test/a"));
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_collect_urls_nothing_provided() {
        assert!(collect_urls(None, None).is_empty());
    }

    #[test]
    fn test_collect_urls_from_file_reads_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "http://l.test/1,http://l.test/2").unwrap();
        writeln!(file, "http://l.test/3").unwrap();

        let urls = collect_urls_from_file(Some(file.path()), Some("http://l.test/4"));
        assert_eq!(urls.len(), 4);
        assert_eq!(urls[0], "http://l.test/1");
        assert_eq!(urls[3], "http://l.test/4");
    }

    #[test]
    fn test_collect_urls_from_missing_file_is_not_fatal() {
        let urls = collect_urls_from_file(
            Some(Path::new("/definitely/not/here/urls.txt")),
            Some("http://ok.test/1"),
        );
        assert_eq!(urls, vec!["http://ok.test/1"]);
    }
}
