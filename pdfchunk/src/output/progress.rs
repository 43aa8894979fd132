//! Terminal rendering of run progress.
//!
//! [`ProgressBar`] turns [`ProgressEvent`]s published by the
//! [`ProgressTracker`](crate::progress::ProgressTracker) into a single
//! status line on stderr: a spinner for the short phases and a bar while
//! chunks are merged.
//!
//! # Examples
//!
//! ```
//! use pdfchunk::output::progress::ProgressBar;
//! use pdfchunk::progress::{ProgressEvent, RunState};
//!
//! let bar = ProgressBar::new(20);
//! let event = ProgressEvent {
//!     state: RunState::Merging { completed: 1, total: 4 },
//!     percent: 25.0,
//!     elapsed_ms: 1500,
//! };
//! assert_eq!(bar.render(&event, 0), "Merging [====>               ] 1/4 25% 1.5s");
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use tokio::sync::watch;

use crate::progress::{ProgressEvent, RunState};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Status line renderer.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    width: usize,
    enabled: bool,
}

impl ProgressBar {
    /// Renderer with a bar of `width` cells, enabled when stderr is a terminal.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Renderer that never writes.
    pub fn disabled() -> Self {
        Self {
            width: 1,
            enabled: false,
        }
    }

    /// Whether anything is written.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Status line for `event`. `frame` advances the spinner.
    pub fn render(&self, event: &ProgressEvent, frame: usize) -> String {
        let elapsed = format_duration(Duration::from_millis(event.elapsed_ms));

        match &event.state {
            RunState::Merging { completed, total } => format!(
                "Merging {} {completed}/{total} {:.0}% {elapsed}",
                self.bar(event.percent),
                event.percent
            ),
            RunState::Done(summary) => format!(
                "Done: {} output(s), {} failure(s) in {elapsed}",
                summary.outputs.len(),
                summary.failures.len()
            ),
            RunState::Failed(report) => format!("Failed after {elapsed}: {}", report.message),
            state => {
                let spinner = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
                format!("{spinner} {}... {elapsed}", state.phase())
            }
        }
    }

    fn bar(&self, percent: f64) -> String {
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * self.width as f64) as usize;
        let filled = filled.min(self.width);

        let mut bar = String::with_capacity(self.width + 2);
        bar.push('[');
        for cell in 0..self.width {
            bar.push(match cell {
                c if c + 1 < filled || (c + 1 == filled && filled == self.width) => '=',
                c if c + 1 == filled => '>',
                _ => ' ',
            });
        }
        bar.push(']');
        bar
    }

    /// Overwrite the status line with `event`.
    pub fn draw(&self, event: &ProgressEvent, frame: usize) {
        if !self.enabled {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[2K{}", self.render(event, frame));
        let _ = stderr.flush();
    }

    /// Erase the status line.
    pub fn clear(&self) {
        if !self.enabled {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[2K");
        let _ = stderr.flush();
    }

    /// Draw every update from `receiver` until the run reaches a terminal
    /// state or the sender is dropped, then clear the line.
    pub async fn follow(self, mut receiver: watch::Receiver<ProgressEvent>) {
        let mut frame = 0;

        loop {
            let event = receiver.borrow_and_update().clone();
            if event.state.phase().is_terminal() {
                break;
            }

            self.draw(&event, frame);
            frame += 1;

            if receiver.changed().await.is_err() {
                break;
            }
        }

        self.clear();
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new(30)
    }
}

/// Format a duration for display: `850ms`, `1.5s`, `2m 05s`, `1h 02m`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let secs = duration.as_secs();

    if millis < 1000 {
        format!("{millis}ms")
    } else if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{FailureReport, RunSummary};
    use rstest::rstest;

    fn event(state: RunState, elapsed_ms: u64) -> ProgressEvent {
        ProgressEvent {
            percent: state.percent(),
            state,
            elapsed_ms,
        }
    }

    #[rstest]
    #[case(0.0, "[          ]")]
    #[case(50.0, "[====>     ]")]
    #[case(100.0, "[==========]")]
    #[case(150.0, "[==========]")]
    fn test_bar(#[case] percent: f64, #[case] expected: &str) {
        assert_eq!(ProgressBar::new(10).bar(percent), expected);
    }

    #[test]
    fn test_render_merging() {
        let bar = ProgressBar::new(10);
        let line = bar.render(&event(RunState::Merging { completed: 3, total: 4 }, 250), 0);
        assert_eq!(line, "Merging [======>   ] 3/4 75% 250ms");
    }

    #[test]
    fn test_render_spinner_phases() {
        let bar = ProgressBar::new(10);
        let first = bar.render(&event(RunState::Collecting, 0), 0);
        let second = bar.render(&event(RunState::Collecting, 0), 1);

        assert!(first.contains("Collecting..."));
        assert_ne!(first, second);
        assert!(bar.render(&event(RunState::Archiving, 0), 0).contains("Archiving..."));
    }

    #[test]
    fn test_render_terminal_states() {
        let bar = ProgressBar::new(10);

        let done = bar.render(&event(RunState::Done(RunSummary::default()), 2000), 0);
        assert_eq!(done, "Done: 0 output(s), 0 failure(s) in 2.0s");

        let failed = RunState::Failed(FailureReport {
            message: "boom".to_string(),
            chunk: None,
            file: None,
            completed: Vec::new(),
        });
        assert_eq!(bar.render(&event(failed, 10), 0), "Failed after 10ms: boom");
    }

    #[rstest]
    #[case(Duration::from_millis(850), "850ms")]
    #[case(Duration::from_millis(1500), "1.5s")]
    #[case(Duration::from_secs(125), "2m 05s")]
    #[case(Duration::from_secs(3720), "1h 02m")]
    fn test_format_duration(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[tokio::test]
    async fn test_follow_stops_at_terminal_state() {
        let (sender, receiver) = watch::channel(event(RunState::Idle, 0));
        let handle = tokio::spawn(ProgressBar::disabled().follow(receiver));

        sender.send_replace(event(RunState::Collecting, 1));
        sender.send_replace(event(RunState::Done(RunSummary::default()), 2));

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_follow_stops_when_sender_dropped() {
        let (sender, receiver) = watch::channel(event(RunState::Idle, 0));
        let handle = tokio::spawn(ProgressBar::disabled().follow(receiver));

        drop(sender);
        handle.await.unwrap();
    }
}
