//! Run state and progress tracking.
//!
//! A run moves through an explicit set of states:
//!
//! ```text
//! Idle → Collecting → Sequencing → Planning
//! Planning → Merging(0 of N) | Archiving | Done
//! Merging(i of N) → Merging(j of N), j ≥ i | Archiving
//! Archiving → Done
//! any non-terminal state → Failed
//! ```
//!
//! [`ProgressTracker`] validates every transition against this graph, keeps
//! a log of them, and publishes each one on a watch channel so a caller can
//! render progress while the run is in flight.

use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{PdfChunkError, Result};
use crate::merge::OutputSummary;

/// Discriminant of a [`RunState`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing has started.
    Idle,
    /// Enumerating inputs.
    Collecting,
    /// Ordering inputs.
    Sequencing,
    /// Partitioning into chunks.
    Planning,
    /// Merging chunks.
    Merging,
    /// Building the archive.
    Archiving,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed,
}

impl Phase {
    /// Whether no further transitions are allowed, short of a reset.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Collecting => "Collecting",
            Self::Sequencing => "Sequencing",
            Self::Planning => "Planning",
            Self::Merging => "Merging",
            Self::Archiving => "Archiving",
            Self::Done => "Done",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// A chunk that failed while the run kept going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFailure {
    /// Number of the failed chunk.
    pub chunk: usize,
    /// Offending input file, when known.
    pub file: Option<String>,
    /// Human-readable error.
    pub message: String,
}

impl ChunkFailure {
    /// Record `error` against chunk `chunk`.
    pub fn new(chunk: usize, error: &PdfChunkError) -> Self {
        Self {
            chunk,
            file: error.file().map(str::to_string),
            message: error.to_string(),
        }
    }
}

/// Payload of [`RunState::Done`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Produced outputs in chunk order.
    pub outputs: Vec<OutputSummary>,
    /// Sum of the outputs' lengths.
    pub total_bytes: u64,
    /// Chunks skipped under continue-on-error.
    pub failures: Vec<ChunkFailure>,
}

impl RunSummary {
    /// Build a summary, computing the total.
    pub fn new(outputs: Vec<OutputSummary>, failures: Vec<ChunkFailure>) -> Self {
        let total_bytes = outputs.iter().map(|o| o.byte_length).sum();
        Self {
            outputs,
            total_bytes,
            failures,
        }
    }
}

/// Payload of [`RunState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Human-readable error.
    pub message: String,
    /// Chunk being merged when the run failed.
    pub chunk: Option<usize>,
    /// Offending input file, when known.
    pub file: Option<String>,
    /// Outputs completed before the failure. They are not archived.
    pub completed: Vec<OutputSummary>,
}

impl FailureReport {
    /// Describe `error`, keeping the outputs produced so far.
    pub fn from_error(error: &PdfChunkError, completed: Vec<OutputSummary>) -> Self {
        Self {
            message: error.to_string(),
            chunk: error.chunk(),
            file: error.file().map(str::to_string),
            completed,
        }
    }
}

/// State of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RunState {
    /// Nothing has started.
    Idle,
    /// Enumerating inputs.
    Collecting,
    /// Ordering inputs.
    Sequencing,
    /// Partitioning into chunks.
    Planning,
    /// `completed` of `total` chunks are done.
    Merging {
        /// Chunks processed so far.
        completed: usize,
        /// Chunks in the plan.
        total: usize,
    },
    /// Building the archive.
    Archiving,
    /// Finished successfully.
    Done(RunSummary),
    /// Finished with an error.
    Failed(FailureReport),
}

impl RunState {
    /// Phase of this state.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Collecting => Phase::Collecting,
            Self::Sequencing => Phase::Sequencing,
            Self::Planning => Phase::Planning,
            Self::Merging { .. } => Phase::Merging,
            Self::Archiving => Phase::Archiving,
            Self::Done(_) => Phase::Done,
            Self::Failed(_) => Phase::Failed,
        }
    }

    /// Completion percentage in `0.0..=100.0`.
    pub fn percent(&self) -> f64 {
        match self {
            Self::Merging { total: 0, .. } => 100.0,
            Self::Merging { completed, total } => *completed as f64 / *total as f64 * 100.0,
            Self::Archiving | Self::Done(_) => 100.0,
            _ => 0.0,
        }
    }
}

/// Whether `from → to` is an edge of the run state graph.
fn is_legal_transition(from: &RunState, to: &RunState) -> bool {
    use RunState::*;

    if matches!(to, Failed(_)) && !from.phase().is_terminal() {
        return true;
    }

    match (from, to) {
        (Idle, Collecting)
        | (Collecting, Sequencing)
        | (Sequencing, Planning)
        | (Planning, Archiving)
        | (Planning, Done(_))
        | (Merging { .. }, Archiving)
        | (Archiving, Done(_)) => true,
        (Planning, Merging { completed, total }) => *completed == 0 && *total > 0,
        (
            Merging {
                completed: was,
                total: of,
            },
            Merging { completed, total },
        ) => total == of && completed >= was && completed <= total,
        _ => false,
    }
}

/// A recorded transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// State entered.
    pub state: RunState,
    /// Completion percentage after entering it.
    pub percent: f64,
    /// Milliseconds since the tracker was created or reset.
    pub elapsed_ms: u64,
}

/// Drives and records the run state.
#[derive(Debug)]
pub struct ProgressTracker {
    state: RunState,
    started_at: Instant,
    events: Vec<ProgressEvent>,
    sender: watch::Sender<ProgressEvent>,
}

impl ProgressTracker {
    /// Create a tracker in [`RunState::Idle`].
    pub fn new() -> Self {
        let (sender, _) = watch::channel(idle_event());
        Self {
            state: RunState::Idle,
            started_at: Instant::now(),
            events: Vec::new(),
            sender,
        }
    }

    /// Current state.
    pub fn current(&self) -> &RunState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Current completion percentage.
    pub fn percent(&self) -> f64 {
        self.state.percent()
    }

    /// Transitions since creation or the last reset.
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Observe transitions as they happen.
    ///
    /// The receiver always holds the latest event.
    pub fn subscribe(&self) -> watch::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::IllegalTransition`] if `next` is not reachable
    /// from the current state; the state is left unchanged.
    pub fn advance(&mut self, next: RunState) -> Result<()> {
        if !is_legal_transition(&self.state, &next) {
            return Err(PdfChunkError::IllegalTransition {
                from: self.state.phase(),
                to: next.phase(),
            });
        }

        let event = ProgressEvent {
            percent: next.percent(),
            elapsed_ms: self.started_at.elapsed().as_millis() as u64,
            state: next.clone(),
        };

        debug!(
            from = %self.state.phase(),
            to = %next.phase(),
            percent = event.percent,
            "Run state transition"
        );

        self.state = next;
        self.events.push(event.clone());
        self.sender.send_replace(event);

        Ok(())
    }

    /// Move to [`RunState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::IllegalTransition`] if the run already ended.
    pub fn fail(&mut self, report: FailureReport) -> Result<()> {
        self.advance(RunState::Failed(report))
    }

    /// Return to [`RunState::Idle`] from any state and clear the log.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.started_at = Instant::now();
        self.events.clear();
        self.sender.send_replace(idle_event());
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn idle_event() -> ProgressEvent {
    ProgressEvent {
        state: RunState::Idle,
        percent: 0.0,
        elapsed_ms: 0,
    }
}
