//! Batch summary over download results.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::download::DownloadResult;

/// Counts and elapsed time for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Results considered.
    pub total: usize,
    /// Results with status success.
    pub succeeded: usize,
    /// Results with status failure.
    pub failed: usize,
    /// Wall-clock time of the batch.
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl BatchSummary {
    /// True when every result succeeded (vacuously true for an empty batch).
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Reduces results to success/failure counts.
///
/// ```
/// use std::time::Duration;
/// use edu_downloader::report::summarize;
///
/// let summary = summarize(&[], Duration::from_secs(2));
/// assert_eq!((summary.total, summary.succeeded, summary.failed), (0, 0, 0));
/// ```
#[must_use]
pub fn summarize(results: &[DownloadResult], elapsed: Duration) -> BatchSummary {
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    BatchSummary {
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        elapsed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_summarize_counts() {
        let results = vec![
            DownloadResult::success("a", "r", 200, PathBuf::from("/t/a.pdf"), 3),
            DownloadResult::failure("b", "r", 404, "HTTP 404"),
            DownloadResult::success("c", "r", 200, PathBuf::from("/t/c.pdf"), 5),
        ];
        let summary = summarize(&results, Duration::from_millis(1500));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.elapsed, Duration::from_millis(1500));
        assert!(!summary.all_succeeded());
    }

    #[test]
    fn test_summarize_empty_is_all_zero() {
        let summary = summarize(&[], Duration::ZERO);
        assert_eq!(summary, BatchSummary::default());
        assert!(summary.all_succeeded());
    }

    #[test]
    fn test_summary_serializes_elapsed_seconds() {
        let summary = summarize(&[], Duration::from_millis(2500));
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["elapsed_secs"], 2.5);
        assert_eq!(json["total"], 0);
    }
}
