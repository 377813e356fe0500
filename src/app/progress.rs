//! Progress bar driven by per-result download notifications.

use std::sync::Arc;
use std::time::Duration;

use edu_downloader::DownloadResult;
use edu_downloader::download::ResultObserver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::output::truncate_to_width;

/// Owns the optional progress bar for one batch.
///
/// The bar stays hidden until [`ProgressReporter::start`] knows the total.
pub(crate) struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub(crate) fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        });
        Self { bar }
    }

    /// Callback that advances the bar once per finished download.
    pub(crate) fn observer(&self) -> ResultObserver {
        let bar = self.bar.clone();
        Arc::new(move |result: &DownloadResult| {
            if let Some(bar) = &bar {
                bar.set_message(truncate_to_width(&result.url, 50));
                bar.inc(1);
            }
        })
    }

    /// Shows the bar sized for `total` downloads.
    pub(crate) fn start(&self, total: usize) {
        let Some(bar) = &self.bar else {
            return;
        };
        if total == 0 {
            return;
        }
        bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(100));
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        self.bar.as_ref().map(ProgressBar::position)
    }
}
