//! pdfchunk - Merge PDF files into size-bounded parts bundled in one ZIP archive.

mod cli;

use clap::Parser;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfchunk::archive::OutputNaming;
use pdfchunk::config::{
    ByteSize, CompressionLevel, Config, DEFAULT_HEADROOM, OverwriteMode, PlanOptions, Strategy,
};
use pdfchunk::error::PdfChunkError;
use pdfchunk::io::ArchiveWriter;
use pdfchunk::output::{
    OutputFormatter, ProgressBar, display_failure, display_outcome, display_plan,
};
use pdfchunk::pipeline::Pipeline;
use pdfchunk::progress::{ProgressTracker, RunState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Route library diagnostics to stderr, filtered by `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

impl TryFrom<&Cli> for Config {
    type Error = PdfChunkError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let limit = ByteSize::parse(&cli.limit)
            .map_err(|e| PdfChunkError::invalid_config(format!("Invalid --limit: {e:#}")))?;
        let strategy: Strategy = cli.strategy.parse()?;
        let compression: CompressionLevel = cli.compression.parse()?;

        let overwrite_mode = if cli.force {
            OverwriteMode::Force
        } else if cli.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let mut config = Config::new(cli.inputs.clone(), cli.output.clone());
        config.plan = PlanOptions::new(limit.bytes(), strategy)
            .with_headroom(cli.headroom.unwrap_or(DEFAULT_HEADROOM));
        config.compression = compression;
        config.naming = cli
            .prefix
            .as_deref()
            .map(OutputNaming::new)
            .unwrap_or_default();
        config.continue_on_error = cli.continue_on_error;
        config.dry_run = cli.dry_run;
        config.verbose = cli.verbose;
        config.quiet = cli.quiet;
        config.overwrite_mode = overwrite_mode;

        config.validate()?;
        Ok(config)
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfChunkError> {
    let config = Config::try_from(&cli)?;
    let formatter = if cli.json {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::from_config(&config)
    };

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfchunk::NAME, pdfchunk::VERSION));
    }

    let writer = ArchiveWriter::new();
    if !config.dry_run {
        handle_output_overwrite(&config, &formatter, &writer).await?;
        writer.can_write(&config.output).await?;
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let mut tracker = ProgressTracker::new();
    let bar = if formatter.should_print() {
        ProgressBar::default()
    } else {
        ProgressBar::disabled()
    };
    let renderer = tokio::spawn(bar.follow(tracker.subscribe()));

    let pipeline = Pipeline::from_config(&config);
    let result = pipeline.run(&config.inputs, &mut tracker, &cancel).await;

    let final_state = tracker.current().clone();
    drop(tracker);
    let _ = renderer.await;

    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            if let RunState::Failed(report) = &final_state {
                if cli.json {
                    print_json(report)?;
                } else {
                    display_failure(&formatter, report);
                }
            }
            return Err(err);
        }
    };

    if config.dry_run {
        if cli.json {
            return print_json(&outcome);
        }

        display_plan(&formatter, &outcome.plan);
        formatter.success("Dry run completed");
        formatter.info(&format!("  Archive would be: {}", config.output.display()));
        return Ok(());
    }

    if formatter.is_verbose() {
        display_plan(&formatter, &outcome.plan);
    }

    if let Some(archive) = outcome.archive.take() {
        let stats = writer.save(archive, &config.output).await?;

        if cli.json {
            return print_json(&outcome);
        }

        display_outcome(&formatter, &outcome);
        formatter.success(&format!(
            "Created {} ({})",
            stats.output_path.display(),
            stats.format_file_size()
        ));

        if formatter.is_verbose() {
            formatter.section("Statistics");
            formatter.detail("Input files", &outcome.collected.files.to_string());
            formatter.detail("Directories", &outcome.collected.directories.to_string());
            formatter.detail("Skipped", &outcome.collected.skipped.to_string());
            formatter.detail(
                "Write time",
                &format!("{:.2}s", stats.write_time.as_secs_f64()),
            );
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PdfChunkError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PdfChunkError::other(format!("Failed to encode report: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Handle an already existing output archive.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
    writer: &ArchiveWriter,
) -> Result<(), PdfChunkError> {
    if !writer.exists(&config.output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfChunkError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask.
            if formatter.is_quiet() {
                return Err(PdfChunkError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            if confirm(&mut io::stdin().lock())? {
                Ok(())
            } else {
                Err(PdfChunkError::Cancelled)
            }
        }
    }
}

/// Read a yes/no answer; anything but `y`/`yes` is no.
fn confirm(input: &mut impl BufRead) -> Result<bool, PdfChunkError> {
    let mut response = String::new();
    input
        .read_line(&mut response)
        .map_err(|err| PdfChunkError::other(format!("Failed to read input: {err}")))?;

    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}
