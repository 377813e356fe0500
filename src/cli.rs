//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download course documents from education platform pages.
///
/// Each page URL is fetched, the PDF (and optionally MP3) resources it
/// references are collected, and every resource is downloaded into the
/// output directory with a per-item report.
#[derive(Parser, Debug)]
#[command(name = "edu-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Page URLs, comma separated
    #[arg(short = 'u', long, value_name = "URLS")]
    pub urls: Option<String>,

    /// File with page URLs, one or more (comma separated) per line
    #[arg(short = 'f', long = "list-file", visible_alias = "list_file", value_name = "PATH")]
    pub list_file: Option<PathBuf>,

    /// Directory downloads are saved to [default: downloads]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also download audio files
    #[arg(short = 'a', long)]
    pub audio: bool,

    /// Prompt for URLs, selection and save path
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent downloads (1-32) [default: 6]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: Option<u8>,

    /// Maximum concurrent page fetches (1-32) [default: 4]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub fetch_concurrency: Option<u8>,

    /// Attempts per request including the first (1-5) [default: 2]
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub max_attempts: Option<u8>,

    /// Timeout for one page request in seconds (1-3600) [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub fetch_timeout: Option<u64>,

    /// Print the batch report as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// True when URLs were supplied through `-u` or `-f`.
    #[must_use]
    pub fn has_url_sources(&self) -> bool {
        self.urls.is_some() || self.list_file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["edu-downloader"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.interactive);
        assert!(args.urls.is_none());
        assert!(args.concurrency.is_none());
        assert!(!args.has_url_sources());
    }

    #[test]
    fn test_cli_url_sources() {
        let args =
            Args::try_parse_from(["edu-downloader", "-u", "https://a.test/1,https://a.test/2"])
                .unwrap();
        assert_eq!(args.urls.as_deref(), Some("https://a.test/1,https://a.test/2"));
        assert!(args.has_url_sources());

        let args = Args::try_parse_from(["edu-downloader", "--list-file", "urls.txt"]).unwrap();
        assert_eq!(args.list_file, Some(PathBuf::from("urls.txt")));

        let args = Args::try_parse_from(["edu-downloader", "--list_file", "urls.txt"]).unwrap();
        assert_eq!(args.list_file, Some(PathBuf::from("urls.txt")));
    }

    #[test]
    fn test_cli_mode_flags() {
        let args = Args::try_parse_from(["edu-downloader", "-a", "-i", "-d", "--json"]).unwrap();
        assert!(args.audio);
        assert!(args.interactive);
        assert!(args.debug);
        assert!(args.json);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["edu-downloader", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["edu-downloader", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["edu-downloader", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["edu-downloader", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["edu-downloader", "-c", "32"]).unwrap();
        assert_eq!(args.concurrency, Some(32));

        for bad in ["0", "33"] {
            let err = Args::try_parse_from(["edu-downloader", "-c", bad]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_max_attempts_bounds() {
        let args = Args::try_parse_from(["edu-downloader", "-r", "1"]).unwrap();
        assert_eq!(args.max_attempts, Some(1));

        let err = Args::try_parse_from(["edu-downloader", "-r", "6"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_fetch_timeout_rejects_zero() {
        let args = Args::try_parse_from(["edu-downloader", "--fetch-timeout", "10"]).unwrap();
        assert_eq!(args.fetch_timeout, Some(10));

        let err = Args::try_parse_from(["edu-downloader", "--fetch-timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
