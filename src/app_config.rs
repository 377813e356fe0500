//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use edu_downloader::download::constants::{
    CONNECT_TIMEOUT_SECS, FETCH_TIMEOUT_SECS, MAX_CONCURRENCY, MIN_CONCURRENCY, READ_TIMEOUT_SECS,
};
use edu_downloader::download::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT};
use edu_downloader::fetch::DEFAULT_FETCH_CONCURRENCY;
use edu_downloader::pipeline::DEFAULT_OUTPUT_DIR;
use edu_downloader::{FetchOptions, PipelineOptions, RetryPolicy};

use crate::cli::Args;

const CONFIG_DIR_NAME: &str = "edu-downloader";

/// TOML-backed file configuration for downloader defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default output directory for downloads.
    pub output_dir: Option<PathBuf>,
    /// Also download audio resources.
    pub audio: Option<bool>,
    /// Default download concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Default page fetch concurrency.
    pub fetch_concurrency: Option<u8>,
    /// Attempts per request, first try included.
    pub max_attempts: Option<u8>,
    /// Per-request timeout for page data, in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_worker_count("concurrency", self.concurrency)?;
        validate_worker_count("fetch_concurrency", self.fetch_concurrency)?;
        if let Some(attempts) = self.max_attempts
            && !(1..=MAX_ATTEMPTS_LIMIT).contains(&u32::from(attempts))
        {
            bail!(
                "Invalid config value for `max_attempts`: {attempts}. Expected range: 1..={MAX_ATTEMPTS_LIMIT}"
            );
        }
        validate_timeout_secs("fetch_timeout_secs", self.fetch_timeout_secs)?;
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_worker_count(field: &str, value: Option<u8>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&usize::from(value)) {
        bail!(
            "Invalid config value for `{field}`: {value}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}"
        );
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the tracing level this label stands for.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose | Self::Debug => "debug",
            Self::Quiet => "error",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/edu-downloader/config.toml`
/// 2. `$HOME/.config/edu-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "audio" => cfg.audio = Some(parse_boolean(value).with_context(context)?),
            "concurrency" => cfg.concurrency = Some(parse_integer_u8(value).with_context(context)?),
            "fetch_concurrency" => {
                cfg.fetch_concurrency = Some(parse_integer_u8(value).with_context(context)?);
            }
            "max_attempts" => {
                cfg.max_attempts = Some(parse_integer_u8(value).with_context(context)?);
            }
            "fetch_timeout_secs" => {
                cfg.fetch_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u16>()?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Effective settings for one process run.
///
/// Command-line values win over file values, which win over built-in
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    pub audio: bool,
    pub concurrency: usize,
    pub fetch_concurrency: usize,
    pub max_attempts: u32,
    pub fetch_timeout: Duration,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub log_level: &'static str,
    pub quiet: bool,
    pub json: bool,
}

impl RunSettings {
    /// Merges CLI arguments over an optional file config.
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();
        Self {
            output_dir: args
                .output
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            audio: args.audio || file.audio.unwrap_or(false),
            concurrency: args
                .concurrency
                .or(file.concurrency)
                .map_or(DEFAULT_CONCURRENCY, usize::from),
            fetch_concurrency: args
                .fetch_concurrency
                .or(file.fetch_concurrency)
                .map_or(DEFAULT_FETCH_CONCURRENCY, usize::from),
            max_attempts: args
                .max_attempts
                .or(file.max_attempts)
                .map_or(DEFAULT_MAX_ATTEMPTS, u32::from),
            fetch_timeout: Duration::from_secs(
                args.fetch_timeout
                    .or(file.fetch_timeout_secs)
                    .unwrap_or(FETCH_TIMEOUT_SECS),
            ),
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
            log_level: default_log_level(args, file.verbosity),
            quiet: args.quiet || file.verbosity == Some(VerbositySetting::Quiet),
            json: args.json,
        }
    }

    /// Builds pipeline options writing into `target_dir`.
    #[must_use]
    pub fn pipeline_options(&self, target_dir: &Path) -> PipelineOptions {
        PipelineOptions {
            target_dir: target_dir.to_path_buf(),
            wants_audio: self.audio,
            fetch: FetchOptions {
                concurrency: self.fetch_concurrency,
                timeout: self.fetch_timeout,
                retry: RetryPolicy::with_max_attempts(self.max_attempts),
            },
            download_concurrency: self.concurrency,
            download_retry: RetryPolicy::with_max_attempts(self.max_attempts),
        }
    }
}

/// Picks the log level when `RUST_LOG` is not set.
///
/// Priority: quiet flag > `-vv` > debug flag or `-v` > config verbosity > info.
fn default_log_level(args: &Args, verbosity: Option<VerbositySetting>) -> &'static str {
    if args.quiet {
        "error"
    } else if args.verbose >= 2 {
        "trace"
    } else if args.debug || args.verbose == 1 {
        "debug"
    } else {
        verbosity.map_or("info", VerbositySetting::log_level)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["edu-downloader"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).expect("arguments should parse")
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
concurrency = 8
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.concurrency, Some(8));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
output_dir = "/srv/course"
audio = true
concurrency = 12
fetch_concurrency = 3
max_attempts = 4
fetch_timeout_secs = 20
connect_timeout_secs = 10
read_timeout_secs = 600
verbosity = "debug"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/course")));
        assert_eq!(cfg.audio, Some(true));
        assert_eq!(cfg.concurrency, Some(12));
        assert_eq!(cfg.fetch_concurrency, Some(3));
        assert_eq!(cfg.max_attempts, Some(4));
        assert_eq!(cfg.fetch_timeout_secs, Some(20));
        assert_eq!(cfg.connect_timeout_secs, Some(10));
        assert_eq!(cfg.read_timeout_secs, Some(600));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Debug));
    }

    #[test]
    fn test_parse_config_rejects_invalid_concurrency() {
        let err = parse_config_str("concurrency = 0").expect_err("invalid concurrency expected");
        assert!(err.to_string().contains("concurrency"));

        let err = parse_config_str("fetch_concurrency = 33").expect_err("33 is above range");
        assert!(err.to_string().contains("fetch_concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_max_attempts() {
        let err = parse_config_str("max_attempts = 6").expect_err("6 is above range");
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err = parse_config_str("concurrency = 4 trailing")
            .expect_err("expected trailing token error");
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout_value() {
        let err =
            parse_config_str("connect_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
output_dir = "notes#1" # hash inside quotes is kept
verbosity = "quiet" # preferred noise level
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("notes#1")));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("audio = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("audio"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("audio true").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_load_file_config_reports_path_on_error() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "concurrency = 99\n").expect("write config");

        let err = load_file_config(&path).expect_err("out of range value");
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn test_resolve_settings_defaults() {
        let settings = RunSettings::resolve(&args(&[]), None);
        assert_eq!(settings.output_dir, PathBuf::from("downloads"));
        assert!(!settings.audio);
        assert_eq!(settings.concurrency, 6);
        assert_eq!(settings.fetch_concurrency, 4);
        assert_eq!(settings.max_attempts, 2);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
        assert_eq!(settings.connect_timeout_secs, 30);
        assert_eq!(settings.read_timeout_secs, 300);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_resolve_settings_cli_wins_over_file() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("from-file")),
            concurrency: Some(3),
            max_attempts: Some(5),
            audio: Some(true),
            ..FileConfig::default()
        };
        let settings = RunSettings::resolve(&args(&["-o", "from-cli", "-c", "9"]), Some(&file));
        assert_eq!(settings.output_dir, PathBuf::from("from-cli"));
        assert_eq!(settings.concurrency, 9);
        assert_eq!(settings.max_attempts, 5);
        assert!(settings.audio);
    }

    #[test]
    fn test_log_level_priority() {
        let quiet_file = FileConfig {
            verbosity: Some(VerbositySetting::Quiet),
            ..FileConfig::default()
        };
        assert_eq!(RunSettings::resolve(&args(&["-q", "-v"]), None).log_level, "error");
        assert_eq!(RunSettings::resolve(&args(&["-vv"]), None).log_level, "trace");
        assert_eq!(RunSettings::resolve(&args(&["-d"]), None).log_level, "debug");
        assert_eq!(
            RunSettings::resolve(&args(&["-v"]), Some(&quiet_file)).log_level,
            "debug"
        );
        assert_eq!(RunSettings::resolve(&args(&[]), Some(&quiet_file)).log_level, "error");
    }

    #[test]
    fn test_pipeline_options_carry_settings() {
        let settings = RunSettings::resolve(&args(&["-a", "-r", "3", "--fetch-concurrency", "2"]), None);
        let options = settings.pipeline_options(Path::new("/tmp/out"));
        assert_eq!(options.target_dir, PathBuf::from("/tmp/out"));
        assert!(options.wants_audio);
        assert_eq!(options.fetch.concurrency, 2);
        assert_eq!(options.fetch.retry.max_attempts(), 3);
        assert_eq!(options.download_retry.max_attempts(), 3);
    }
}
