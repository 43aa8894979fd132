//! Dry runs and empty inputs.

use pdfchunk::Config;
use pdfchunk::config::{PlanOptions, Strategy};
use pdfchunk::pipeline::Pipeline;
use pdfchunk::progress::{Phase, ProgressTracker, RunState};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::common::{archive_names, write_file, write_pdf};

#[tokio::test]
async fn test_dry_run_plans_without_merging() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "b.pdf");
    write_pdf(dir.path(), "a.pdf");
    // Never parsed in a dry run.
    write_file(dir.path(), "broken.pdf", b"%PDF-1.5 garbage");

    let mut config = Config::new(vec![dir.path().to_path_buf()], dir.path().join("out.zip"));
    config.plan = PlanOptions::new(1, Strategy::Overflow);
    config.dry_run = true;

    let mut tracker = ProgressTracker::new();
    let outcome = Pipeline::from_config(&config)
        .run(&config.inputs, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.archive.is_none());
    assert!(outcome.outputs.is_empty());
    assert_eq!(outcome.plan.chunks.len(), 3);
    assert_eq!(outcome.plan.chunks[0].files, vec!["a.pdf"]);
    assert_eq!(outcome.plan.chunks[2].files, vec!["broken.pdf"]);

    let phases: Vec<Phase> = tracker.events().iter().map(|e| e.state.phase()).collect();
    assert_eq!(
        phases,
        vec![Phase::Collecting, Phase::Sequencing, Phase::Planning, Phase::Done]
    );
    assert!(!dir.path().join("out.zip").exists());
}

#[tokio::test]
async fn test_empty_directory_yields_empty_archive() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "readme.txt", b"nothing to merge");

    let mut tracker = ProgressTracker::new();
    let outcome = Pipeline::default()
        .run(&[dir.path().to_path_buf()], &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.plan.chunks.is_empty());
    assert!(outcome.outputs.is_empty());
    assert_eq!(outcome.total_bytes(), 0);
    assert!(archive_names(&outcome.archive.unwrap()).is_empty());

    match tracker.current() {
        RunState::Done(summary) => {
            assert!(summary.outputs.is_empty());
            assert_eq!(summary.total_bytes, 0);
        }
        other => panic!("expected Done, got {other:?}"),
    }
    assert!(
        !tracker
            .events()
            .iter()
            .any(|e| e.state.phase() == Phase::Merging)
    );
}

#[tokio::test]
async fn test_outcome_serializes_without_archive_bytes() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "only.pdf");

    let mut tracker = ProgressTracker::new();
    let outcome = Pipeline::default()
        .run(&[dir.path().to_path_buf()], &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json.get("archive").is_none());
    assert_eq!(json["outputs"][0]["name"], "merged_part_1.pdf");
    assert_eq!(json["plan"]["strategy"], "bounded");
    assert_eq!(json["collected"]["files"], 1);

    let state = serde_json::to_value(tracker.current()).unwrap();
    assert_eq!(state["phase"], "done");
}
