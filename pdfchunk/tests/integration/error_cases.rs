//! Failure handling: bad members, missing inputs and cancellation.

use pdfchunk::PdfChunkError;
use pdfchunk::collect::FileDescriptor;
use pdfchunk::config::{PlanOptions, Strategy};
use pdfchunk::pipeline::{Pipeline, PipelineOptions};
use pdfchunk::progress::{Phase, ProgressTracker, RunState};
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::common::{archive_entries, page_labels, pdf_bytes, write_file, write_pdf};

fn one_per_chunk(continue_on_error: bool) -> Pipeline {
    Pipeline::new(PipelineOptions {
        plan: PlanOptions::new(1, Strategy::Overflow),
        continue_on_error,
        ..PipelineOptions::default()
    })
}

#[tokio::test]
async fn test_unparsable_member_fails_run() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_pdf(dir.path(), "a.pdf"),
        write_file(dir.path(), "b.pdf", b"this is not a pdf"),
        write_pdf(dir.path(), "c.pdf"),
    ];

    let mut tracker = ProgressTracker::new();
    let err = one_per_chunk(false)
        .run(&inputs, &mut tracker, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PdfChunkError::ParseFailed { .. }));
    assert_eq!(err.file(), Some("b.pdf"));
    assert_eq!(err.chunk(), Some(2));

    match tracker.current() {
        RunState::Failed(report) => {
            assert_eq!(report.file.as_deref(), Some("b.pdf"));
            assert_eq!(report.chunk, Some(2));
            assert_eq!(report.completed.len(), 1);
            assert_eq!(report.completed[0].name, "merged_part_1.pdf");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(
        !tracker
            .events()
            .iter()
            .any(|e| e.state.phase() == Phase::Archiving)
    );
}

#[tokio::test]
async fn test_continue_on_error_keeps_planned_numbers() {
    let files = vec![
        FileDescriptor::from_bytes("a.pdf", pdf_bytes("a", 1)),
        FileDescriptor::from_bytes("b.pdf", b"garbage".to_vec()),
        FileDescriptor::from_bytes("c.pdf", pdf_bytes("c", 2)),
    ];

    let mut tracker = ProgressTracker::new();
    let outcome = one_per_chunk(true)
        .run_descriptors(files, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].chunk, 2);
    assert_eq!(outcome.failures[0].file.as_deref(), Some("b.pdf"));

    let entries = archive_entries(&outcome.archive.unwrap());
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["merged_part_1.pdf", "merged_part_3.pdf"]);
    assert_eq!(page_labels(&entries[1].1), vec!["c 1", "c 2"]);

    match tracker.current() {
        RunState::Done(summary) => assert_eq!(summary.failures, outcome.failures),
        other => panic!("expected Done, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_input_fails_before_planning() {
    let mut tracker = ProgressTracker::new();
    let err = Pipeline::default()
        .run(
            &[PathBuf::from("/definitely/not/here.pdf")],
            &mut tracker,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PdfChunkError::FileNotFound { .. }));
    assert_eq!(tracker.phase(), Phase::Failed);

    let phases: Vec<Phase> = tracker.events().iter().map(|e| e.state.phase()).collect();
    assert_eq!(phases, vec![Phase::Collecting, Phase::Failed]);
}

#[tokio::test]
async fn test_cancelled_run_produces_no_archive() {
    let files = vec![FileDescriptor::from_bytes("a.pdf", pdf_bytes("a", 1))];
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut tracker = ProgressTracker::new();
    let err = one_per_chunk(true)
        .run_descriptors(files, &mut tracker, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PdfChunkError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert_eq!(tracker.phase(), Phase::Failed);
}

#[tokio::test]
async fn test_tracker_cannot_be_reused_without_reset() {
    let mut tracker = ProgressTracker::new();
    let pipeline = Pipeline::default();
    let cancel = CancellationToken::new();

    pipeline
        .run_descriptors(Vec::new(), &mut tracker, &cancel)
        .await
        .unwrap();

    let err = pipeline
        .run_descriptors(Vec::new(), &mut tracker, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, PdfChunkError::IllegalTransition { .. }));

    tracker.reset();
    assert!(pipeline.run_descriptors(Vec::new(), &mut tracker, &cancel).await.is_ok());
}
