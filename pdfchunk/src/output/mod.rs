//! User-facing output: messages, progress and run reports.
//!
//! The `*_lines` functions build report text without printing, the
//! `display_*` functions send it through an [`OutputFormatter`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfchunk::output::{OutputFormatter, display_outcome};
//! use pdfchunk::pipeline::RunOutcome;
//!
//! # fn example(outcome: RunOutcome) {
//! let formatter = OutputFormatter::default();
//! display_outcome(&formatter, &outcome);
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, format_duration};

use crate::pipeline::RunOutcome;
use crate::plan::PlanSummary;
use crate::progress::{ChunkFailure, FailureReport};
use crate::utils::format_file_size;

/// Lines describing a chunk plan, one per chunk.
pub fn plan_lines(plan: &PlanSummary) -> Vec<String> {
    plan.chunks
        .iter()
        .map(|chunk| {
            let marker = if chunk.oversized { " (oversized)" } else { "" };
            format!(
                "Chunk {}: {} file(s), {}{marker}",
                chunk.number,
                chunk.files.len(),
                format_file_size(chunk.size_bytes)
            )
        })
        .collect()
}

/// Table of produced outputs: name, size, pages.
pub fn outcome_lines(outcome: &RunOutcome) -> Vec<String> {
    let width = outcome
        .outputs
        .iter()
        .map(|o| o.name.len())
        .max()
        .unwrap_or(0)
        .max("Total".len());

    let mut lines: Vec<String> = outcome
        .outputs
        .iter()
        .map(|o| {
            format!(
                "{:<width$}  {:>12}  {} page(s)",
                o.name,
                format_file_size(o.byte_length),
                o.page_count
            )
        })
        .collect();

    lines.push(format!(
        "{:<width$}  {:>12}",
        "Total",
        format_file_size(outcome.total_bytes())
    ));
    lines
}

fn failure_line(failure: &ChunkFailure) -> String {
    match &failure.file {
        Some(file) => format!("Chunk {} ({file}): {}", failure.chunk, failure.message),
        None => format!("Chunk {}: {}", failure.chunk, failure.message),
    }
}

/// Display a chunk plan.
pub fn display_plan(formatter: &OutputFormatter, plan: &PlanSummary) {
    formatter.section(&format!(
        "Plan: {} chunk(s), {} total, limit {} ({})",
        plan.chunks.len(),
        format_file_size(plan.total_bytes),
        format_file_size(plan.limit_bytes),
        plan.strategy
    ));

    for line in plan_lines(plan) {
        formatter.line(&line);
    }

    for chunk in plan.chunks.iter().filter(|c| c.oversized) {
        formatter.warning(&format!(
            "{} exceeds the limit on its own",
            chunk.files.join(", ")
        ));
    }

    if formatter.is_verbose() {
        for chunk in &plan.chunks {
            formatter.detail(&format!("Chunk {}", chunk.number), &chunk.files.join(", "));
        }
    }
}

/// Display the result of a completed run.
pub fn display_outcome(formatter: &OutputFormatter, outcome: &RunOutcome) {
    if outcome.outputs.is_empty() {
        formatter.info("No outputs produced");
    } else {
        formatter.section("Outputs");
        for line in outcome_lines(outcome) {
            formatter.line(&line);
        }
    }

    for failure in &outcome.failures {
        formatter.warning(&format!("Skipped {}", failure_line(failure)));
    }
}

/// Display where a failed run stopped and what it discarded.
///
/// The error message itself is left to the caller.
pub fn display_failure(formatter: &OutputFormatter, report: &FailureReport) {
    let location = match (report.chunk, &report.file) {
        (Some(chunk), Some(file)) => format!(" in chunk {chunk} ({file})"),
        (Some(chunk), None) => format!(" in chunk {chunk}"),
        (None, Some(file)) => format!(" at {file}"),
        (None, None) => String::new(),
    };
    formatter.warning(&format!("Run stopped{location}"));

    if !report.completed.is_empty() {
        formatter.info(&format!(
            "{} output(s) completed before the failure were discarded",
            report.completed.len()
        ));
    }
}
