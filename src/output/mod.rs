//! CLI output formatting and display helpers.

use anyhow::Result;
use edu_downloader::report::BatchSummary;
use edu_downloader::{DownloadResult, PipelineReport};

/// Shown when neither URLs nor interactive mode were requested.
pub const NO_INPUT_GUIDANCE: &str = "No URLs given. Use -u/-f to provide page URLs, or -i for interactive mode.";

/// Example for passing URLs inline.
pub const INPUT_ARG_EXAMPLE: &str =
    "Example: edu-downloader -u https://example.com/course/1,https://example.com/course/2";

const BANNER: &str = r"
   ___    _          ___                  _              _
  | __|__| |_  _    |   \ _____ __ ___ _ | |___  __ _ __| |___ _ _
  | _|/ _` | || |   | |) / _ \ V  V / ' \| / _ \/ _` / _` / -_) '_|
  |___\__,_|\_,_|   |___/\___/\_/\_/|_||_|_\___/\__,_\__,_\___|_|
";

/// Placeholder for a missing saved path.
const NO_FILE: &str = "---";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Prints the welcome banner.
pub fn print_welcome() {
    println!("{BANNER}");
    println!("=== Education Platform Resource Downloader ===");
    println!("Batch downloads PDF (and optionally MP3) resources referenced by course pages.\n");
}

/// Prints guidance when there is nothing to do.
pub fn print_quick_start_guidance() {
    let width = terminal_width().min(100);
    println!("{}", truncate_to_width(INPUT_ARG_EXAMPLE, width));
}

/// Renders a numbered URL list with 1-based indices.
pub(crate) fn url_list_lines(title: &str, urls: &[String]) -> Vec<String> {
    let mut lines = vec![format!("\n{title}:")];
    lines.extend(
        urls.iter()
            .enumerate()
            .map(|(index, url)| format!("{}. {url}", index + 1)),
    );
    lines
}

/// Prints the batch report as tables or JSON.
pub fn print_report(report: &PipelineReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.cancelled {
        println!("\nBatch interrupted; unfinished items are reported as cancelled.");
    }
    println!();
    for line in summary_lines(&report.summary) {
        println!("{line}");
    }
    if !report.results.is_empty() {
        println!();
        for line in detail_lines(&report.results, terminal_width()) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Renders the summary table: total, succeeded, failed and elapsed time.
pub(crate) fn summary_lines(summary: &BatchSummary) -> Vec<String> {
    vec![
        "Download summary".to_string(),
        format!("  {:<12} {}", "Total files", summary.total),
        format!("  {:<12} {}", "Succeeded", summary.succeeded),
        format!("  {:<12} {}", "Failed", summary.failed),
        format!("  {:<12} {:.1}s", "Elapsed", summary.elapsed.as_secs_f64()),
    ]
}

pub(crate) fn status_label(result: &DownloadResult) -> String {
    if result.is_success() {
        format!("success ({})", result.code())
    } else {
        format!("failed ({})", result.code())
    }
}

/// Renders the detail table, one row per result.
///
/// The URL column shows the origin page so failures can be traced back to
/// their input.
pub(crate) fn detail_lines(results: &[DownloadResult], width: usize) -> Vec<String> {
    let rows: Vec<(String, String, String, String)> = results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            let saved = result
                .file()
                .map_or_else(|| NO_FILE.to_string(), |path| path.display().to_string());
            (
                (index + 1).to_string(),
                result.raw.clone(),
                status_label(result),
                saved,
            )
        })
        .collect();

    let index_width = rows.iter().map(|row| row.0.len()).max().unwrap_or(1).max(1);
    let status_width = rows
        .iter()
        .map(|row| row.2.chars().count())
        .max()
        .unwrap_or(0)
        .max("Status".len());
    let url_budget = (width / 2).max(20);
    let url_width = rows
        .iter()
        .map(|row| row.1.chars().count())
        .max()
        .unwrap_or(0)
        .clamp("URL".len(), url_budget);

    let mut lines = vec![
        "Download details".to_string(),
        format!(
            "{:>index_width$}  {:<url_width$}  {:<status_width$}  Saved to",
            "#", "URL", "Status"
        ),
    ];
    for (index, url, status, saved) in rows {
        let url = truncate_to_width(&url, url_width);
        lines.push(
            format!("{index:>index_width$}  {url:<url_width$}  {status:<status_width$}  {saved}")
                .trim_end()
                .to_string(),
        );
    }
    lines
}
