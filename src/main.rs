//! CLI entry point for the education resource downloader.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};

mod app;
mod app_config;
mod cli;
mod output;

use app::AppContext;
use app::terminal::{init_tracing, no_color_env_requested};
use app_config::{RunSettings, load_default_file_config};
use cli::Args;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        match outcome {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match run(args).await {
        Ok(outcome) => outcome.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ProcessExit> {
    let loaded = load_default_file_config()?;
    let settings = RunSettings::resolve(&args, loaded.config.as_ref());

    init_tracing(settings.log_level, no_color_env_requested());
    debug!(?args, config_path = ?loaded.path, "CLI arguments parsed");

    if !settings.quiet && !settings.json {
        output::print_welcome();
    }

    let ctx = AppContext::new(settings);
    app::spawn_interrupt_handler(&ctx);

    if args.has_url_sources() {
        app::run_from_args(&ctx, &args).await
    } else if args.interactive {
        app::run_interactive(&ctx).await
    } else {
        warn!("{}", output::NO_INPUT_GUIDANCE);
        output::print_quick_start_guidance();
        Ok(ProcessExit::Success)
    }
}

