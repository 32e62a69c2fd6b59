//! Load command - bulk-load a dataset into the index

use crate::cli::output::{colors, format_bytes, format_duration, print_warning};
use crate::cli::OutputFormat;
use crate::core::client::Backend;
use crate::core::config::Config;
use crate::core::error::MailbulkError;
use crate::core::indexer::CancellationFlag;
use crate::core::loader::{run_load, LoadOptions};
use crate::core::types::{BatchProgress, LoadReport};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Config file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Dataset root (`<owner>/<folder>/<file>` below it)
    #[arg(long, short = 'd', default_value = "maildir")]
    pub dataset: PathBuf,

    /// Load into the index even if it already exists
    #[arg(long)]
    pub reuse_index: bool,

    /// Run against an in-memory cluster instead of the configured one
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress per-batch progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Load result response
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub dataset: String,
    pub backend: &'static str,
    #[serde(flatten)]
    pub report: LoadReport,
}

fn print_progress(progress: &BatchProgress) {
    let errors = if progress.errors {
        colors::warning(&format!("true ({} failed)", progress.failed))
    } else {
        colors::dim("false")
    };
    eprintln!(
        "Batch {}: {} emails uploaded (total {}). Errors: {}",
        colors::count(progress.batch),
        colors::count(progress.size),
        colors::count(progress.uploaded_total),
        errors
    );
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        colors::success("yes")
    } else {
        colors::warning("no")
    }
}

fn print_report(response: &LoadResponse) {
    let report = &response.report;
    let duration_secs = report.duration_ms as f64 / 1000.0;

    println!(
        "{} {} emails into '{}' in {}",
        colors::success("Uploaded"),
        colors::count(report.documents_uploaded),
        colors::label(&report.index),
        colors::number(&format_duration(duration_secs))
    );
    println!(
        "  Dataset: {} ({})",
        colors::file_path(&response.dataset),
        response.backend
    );
    println!(
        "  Files: {} discovered, {} skipped",
        colors::count(report.documents_discovered),
        colors::count(report.documents_skipped)
    );
    println!(
        "  Batches: {} ({} with errors), {} failed items, {} sent",
        colors::count(report.batches),
        colors::count(report.batches_with_errors),
        colors::count(report.items_failed),
        colors::number(&format_bytes(report.bytes_sent))
    );
    println!(
        "  Index reused: {}  Refresh restored: {}  Compacted: {}",
        yes_no(report.index_reused),
        yes_no(report.refresh_restored),
        yes_no(report.compacted)
    );
}

/// What the failure left behind on the index, for the user
fn failure_hint(err: &MailbulkError, index: &str) -> Option<String> {
    if err.is_conflict() {
        Some(format!(
            "Index '{index}' already exists; pass --reuse-index to load into it"
        ))
    } else if err.is_pre_load() {
        Some(format!("Index '{index}' was not modified"))
    } else if err.is_lifecycle_violation() {
        None
    } else {
        Some(format!(
            "Index '{index}' may still have refresh disabled; reset index.refresh_interval before searching it"
        ))
    }
}

/// Execute the load command
///
/// Returns the response that was printed. A cancelled load is an error
/// after its report has been printed.
pub async fn execute(
    args: LoadArgs,
    format: OutputFormat,
) -> Result<LoadResponse, Box<dyn std::error::Error>> {
    let config = Config::load(args.config.as_deref())?;
    config.log_config();

    let backend = Backend::connect(&config, args.dry_run).await?;

    let cancel = CancellationFlag::new();
    let signal = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current batch");
                cancel.cancel();
            }
        })
    };

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Loading {} into '{}'...",
            colors::file_path(&args.dataset.display().to_string()),
            colors::label(&config.index.name)
        );
    }

    let show_progress = !args.quiet && format == OutputFormat::Human;
    let result = run_load(
        &backend,
        &config,
        &args.dataset,
        LoadOptions {
            reuse_index: args.reuse_index,
        },
        &cancel,
        |progress| {
            if show_progress {
                print_progress(progress);
            }
        },
    )
    .await;
    signal.abort();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let Some(hint) = failure_hint(&e, &config.index.name) {
                print_warning(&hint);
            }
            return Err(e.into());
        }
    };

    let response = LoadResponse {
        dataset: args.dataset.display().to_string(),
        backend: backend.name(),
        report,
    };

    match format {
        OutputFormat::Human => print_report(&response),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    if response.report.cancelled {
        if format == OutputFormat::Human {
            print_warning("Load was interrupted; the index holds a partial dataset");
        }
        return Err("Load cancelled".into());
    }

    Ok(response)
}
