//! Application flow for the CLI: batch runs, interactive sessions and
//! interrupt handling.

mod interactive;
mod progress;
pub(crate) mod terminal;

use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use edu_downloader::parser::collect_urls_from_file;
use edu_downloader::{HttpClient, Pipeline, PipelineReport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::ProcessExit;
use crate::app_config::RunSettings;
use crate::cli::Args;
use crate::output;

use interactive::Prompter;
use progress::ProgressReporter;

/// Shared state for one process run.
pub(crate) struct AppContext {
    pub settings: RunSettings,
    pub cancel: CancellationToken,
    batch_active: Arc<AtomicBool>,
}

impl AppContext {
    pub(crate) fn new(settings: RunSettings) -> Self {
        Self {
            settings,
            cancel: CancellationToken::new(),
            batch_active: Arc::new(AtomicBool::new(false)),
        }
    }

    fn use_progress_bar(&self) -> bool {
        terminal::should_use_progress_bar(
            io::stderr().is_terminal(),
            self.settings.quiet,
            self.settings.json,
            terminal::is_dumb_terminal(),
        )
    }
}

/// Marks a batch as running for the interrupt handler.
struct BatchGuard(Arc<AtomicBool>);

impl BatchGuard {
    fn enter(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Ctrl-C cancels a running batch; outside a batch, or on a second
/// Ctrl-C, the process exits.
pub(crate) fn spawn_interrupt_handler(ctx: &AppContext) {
    let cancel = ctx.cancel.clone();
    let batch_active = Arc::clone(&ctx.batch_active);
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if batch_active.load(Ordering::SeqCst) && !cancel.is_cancelled() {
                warn!("Interrupt received, cancelling downloads");
                cancel.cancel();
            } else {
                eprintln!("\nTerminated");
                std::process::exit(0);
            }
        }
    });
}

/// Runs one batch and prints its report.
pub(crate) async fn run_batch(
    ctx: &AppContext,
    urls: &[String],
    target_dir: &Path,
) -> Result<PipelineReport> {
    let _guard = BatchGuard::enter(&ctx.batch_active);
    let settings = &ctx.settings;
    let json = settings.json;

    let client =
        HttpClient::new_with_timeouts(settings.connect_timeout_secs, settings.read_timeout_secs)
            .context("Failed to build HTTP client")?;
    let progress = ProgressReporter::new(ctx.use_progress_bar());
    let pipeline = Pipeline::new(client, settings.pipeline_options(target_dir))?
        .with_observer(progress.observer());

    if !json {
        println!("Selected {} URLs, saving to {}", urls.len(), target_dir.display());
    }
    let started = Instant::now();
    let discovery = pipeline.discover(urls, &ctx.cancel).await;
    let links = discovery.links();

    if !json {
        println!(
            "\nInput URLs: {}, page configs: {}, resource files: {}",
            discovery.inputs,
            discovery.configs,
            links.len()
        );
        if links.is_empty() {
            println!("\nNo resource files (PDF/MP3) found. Nothing to download.");
        } else {
            println!("\nDownloading files...");
        }
    }

    progress.start(links.len());
    let results = pipeline.download(&links, &ctx.cancel).await;
    progress.finish();
    let results = results.with_context(|| {
        format!("Failed to prepare output directory '{}'", target_dir.display())
    })?;

    let report =
        PipelineReport::assemble(&discovery, results, started.elapsed(), ctx.cancel.is_cancelled());
    info!(
        total = report.summary.total,
        succeeded = report.summary.succeeded,
        failed = report.summary.failed,
        "Batch complete"
    );

    if json || !links.is_empty() {
        output::print_report(&report, json)?;
    }
    Ok(report)
}

/// Non-interactive mode: URLs from `-f` then `-u`.
pub(crate) async fn run_from_args(ctx: &AppContext, args: &Args) -> Result<ProcessExit> {
    let urls = collect_urls_from_file(args.list_file.as_deref(), args.urls.as_deref());
    if urls.is_empty() {
        error!("No valid URLs provided");
        return Ok(ProcessExit::Failure);
    }
    debug!(count = urls.len(), "Collected URLs");

    run_batch(ctx, &urls, &ctx.settings.output_dir).await?;
    Ok(ProcessExit::Success)
}

/// Interactive mode: repeat menu, selection and batch until the user exits.
pub(crate) async fn run_interactive(ctx: &AppContext) -> Result<ProcessExit> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    loop {
        let Some(batch) = prompter.next_batch(&ctx.settings.output_dir)? else {
            prompter.say("\nExiting")?;
            break;
        };
        run_batch(ctx, &batch.urls, &batch.target_dir).await?;

        if ctx.cancel.is_cancelled() || !prompter.ask_continue()? {
            prompter.say("\nDone")?;
            break;
        }
    }
    Ok(ProcessExit::Success)
}
