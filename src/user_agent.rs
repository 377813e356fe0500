//! Shared User-Agent strings for page-data and resource requests.
//!
//! One format for both kinds of traffic so servers see a single,
//! identifiable tool.

const TOOL_NAME: &str = "edu-downloader";

/// User-Agent sent with resource downloads.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{TOOL_NAME}/{version} (course-material-downloader)")
}

/// User-Agent sent with page-data requests.
#[must_use]
pub(crate) fn default_fetch_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{TOOL_NAME}/{version} (course-page-fetcher)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_of(ua: &str) -> Option<&str> {
        ua.strip_prefix("edu-downloader/")
            .and_then(|s| s.split(' ').next())
    }

    #[test]
    fn test_shared_format_consistency() {
        let download_ua = default_download_user_agent();
        let fetch_ua = default_fetch_user_agent();
        assert_eq!(version_of(&download_ua), Some(env!("CARGO_PKG_VERSION")));
        assert_eq!(version_of(&fetch_ua), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_ua_format_keywords() {
        assert!(default_download_user_agent().contains("course-material-downloader"));
        assert!(default_fetch_user_agent().contains("course-page-fetcher"));
    }
}
