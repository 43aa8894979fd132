//! Run orchestration.
//!
//! Drives one run end to end: collect → sequence → plan → merge each chunk
//! in order → archive, advancing a [`ProgressTracker`] at every step. Chunks
//! are merged strictly one after another; chunk `i` is fully merged and added
//! to the archive before chunk `i + 1` starts.
//!
//! By default the first error ends the run in [`RunState::Failed`] and no
//! archive is produced. With `continue_on_error`, a chunk whose merge fails
//! is recorded as a [`ChunkFailure`] and skipped; the archive holds the
//! remaining chunks under their planned names. Cancellation and archive
//! failures always end the run.
//!
//! # Examples
//!
//! ```no_run
//! use pdfchunk::config::Config;
//! use pdfchunk::pipeline::Pipeline;
//! use pdfchunk::progress::ProgressTracker;
//! use std::path::PathBuf;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(vec![PathBuf::from("scans")], PathBuf::from("parts.zip"));
//! let pipeline = Pipeline::from_config(&config);
//! let mut tracker = ProgressTracker::new();
//!
//! let outcome = pipeline
//!     .run(&config.inputs, &mut tracker, &CancellationToken::new())
//!     .await?;
//! println!("{} parts, {} bytes", outcome.outputs.len(), outcome.total_bytes());
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::archive::{ArchiveAssembler, OutputNaming};
use crate::collect::{CollectStats, Collector, FileDescriptor};
use crate::config::{Config, PlanOptions};
use crate::error::{PdfChunkError, Result};
use crate::merge::{MergeEngine, MergeOptions, OutputSummary};
use crate::plan::{ChunkPlanner, PlanSummary};
use crate::progress::{ChunkFailure, FailureReport, ProgressTracker, RunState, RunSummary};
use crate::sequence::sequence;

/// Settings for a run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Chunk planning.
    pub plan: PlanOptions,
    /// Merging.
    pub merge: MergeOptions,
    /// Output names.
    pub naming: OutputNaming,
    /// Skip failing chunks instead of aborting.
    pub continue_on_error: bool,
    /// Stop after planning.
    pub dry_run: bool,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            plan: config.plan,
            merge: MergeOptions {
                compression: config.compression,
            },
            naming: config.naming.clone(),
            continue_on_error: config.continue_on_error,
            dry_run: config.dry_run,
        }
    }
}

/// Result of a run that reached [`RunState::Done`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// What was collected.
    pub collected: CollectStats,
    /// The chunk plan.
    pub plan: PlanSummary,
    /// Produced outputs in chunk order.
    pub outputs: Vec<OutputSummary>,
    /// Chunks skipped under continue-on-error.
    pub failures: Vec<ChunkFailure>,
    /// Serialized archive; `None` for a dry run.
    #[serde(skip)]
    pub archive: Option<Vec<u8>>,
}

impl RunOutcome {
    /// Sum of the outputs' lengths.
    pub fn total_bytes(&self) -> u64 {
        self.outputs.iter().map(|o| o.byte_length).sum()
    }
}

/// Runs collect → sequence → plan → merge → archive.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
    collector: Collector,
    engine: MergeEngine,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            engine: MergeEngine::new(options.merge),
            collector: Collector::new(),
            options,
        }
    }

    /// Create a pipeline from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(PipelineOptions::from(config))
    }

    /// Replace the collector.
    pub fn with_collector(mut self, collector: Collector) -> Self {
        self.collector = collector;
        self
    }

    /// Options in effect.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run over files, directories and glob patterns.
    ///
    /// `tracker` must be idle. On error the tracker is left in
    /// [`RunState::Failed`] with a report naming the failing file and chunk.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the run.
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        tracker.advance(RunState::Collecting)?;

        let (files, stats) = match self.collector.collect(inputs).await {
            Ok(collected) => collected,
            Err(err) => return abort(tracker, err, Vec::new()),
        };

        self.run_collected(files, stats, tracker, cancel).await
    }

    /// Run over descriptors the caller already collected.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the run.
    pub async fn run_descriptors(
        &self,
        files: Vec<FileDescriptor>,
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        tracker.advance(RunState::Collecting)?;

        let stats = CollectStats {
            files: files.len(),
            total_bytes: files.iter().map(FileDescriptor::size_bytes).sum(),
            ..CollectStats::default()
        };

        self.run_collected(files, stats, tracker, cancel).await
    }

    async fn run_collected(
        &self,
        files: Vec<FileDescriptor>,
        collected: CollectStats,
        tracker: &mut ProgressTracker,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        if cancel.is_cancelled() {
            return abort(tracker, PdfChunkError::Cancelled, Vec::new());
        }

        tracker.advance(RunState::Sequencing)?;
        let ordered = sequence(files);

        tracker.advance(RunState::Planning)?;
        let plan = ChunkPlanner::new(self.options.plan).plan(ordered);
        let total = plan.len();

        info!(
            files = collected.files,
            chunks = total,
            strategy = %plan.strategy(),
            limit_bytes = plan.limit_bytes(),
            "Planned run"
        );

        if self.options.dry_run {
            tracker.advance(RunState::Done(RunSummary::default()))?;
            return Ok(RunOutcome {
                collected,
                plan: plan.summary(),
                outputs: Vec::new(),
                failures: Vec::new(),
                archive: None,
            });
        }

        if total > 0 {
            tracker.advance(RunState::Merging {
                completed: 0,
                total,
            })?;
        }

        let mut assembler = ArchiveAssembler::new();
        let mut outputs = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for chunk in plan.chunks() {
            if cancel.is_cancelled() {
                return abort(tracker, PdfChunkError::Cancelled, outputs);
            }

            let name = self.options.naming.name_for(chunk.number(), total);

            match self.engine.merge_chunk(chunk, name, cancel).await {
                Ok(output) => {
                    if let Err(err) = assembler.add(&output) {
                        return abort(tracker, err, outputs);
                    }
                    outputs.push(output.summary());
                }
                Err(err) if self.options.continue_on_error && err.is_recoverable() => {
                    warn!(chunk = chunk.number(), error = %err, "Skipping failed chunk");
                    failures.push(ChunkFailure::new(chunk.number(), &err));
                }
                Err(err) => return abort(tracker, err, outputs),
            }

            tracker.advance(RunState::Merging {
                completed: chunk.number(),
                total,
            })?;
        }

        tracker.advance(RunState::Archiving)?;

        let archive = match assembler.finish() {
            Ok(bytes) => bytes,
            Err(err) => return abort(tracker, err, outputs),
        };

        let summary = RunSummary::new(outputs.clone(), failures.clone());
        info!(
            outputs = summary.outputs.len(),
            failures = summary.failures.len(),
            total_bytes = summary.total_bytes,
            archive_bytes = archive.len(),
            "Run complete"
        );
        tracker.advance(RunState::Done(summary))?;

        Ok(RunOutcome {
            collected,
            plan: plan.summary(),
            outputs,
            failures,
            archive: Some(archive),
        })
    }
}

/// Move the tracker to `Failed` and hand the error back.
fn abort<T>(
    tracker: &mut ProgressTracker,
    err: PdfChunkError,
    completed: Vec<OutputSummary>,
) -> Result<T> {
    warn!(error = %err, "Run failed");
    tracker.fail(FailureReport::from_error(&err, completed))?;
    Err(err)
}
