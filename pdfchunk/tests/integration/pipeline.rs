//! End-to-end runs from files on disk to a written archive.

use pdfchunk::collect::FileDescriptor;
use pdfchunk::config::{CompressionLevel, PlanOptions, Strategy};
use pdfchunk::io::ArchiveWriter;
use pdfchunk::merge::MergeOptions;
use pdfchunk::pipeline::{Pipeline, PipelineOptions};
use pdfchunk::progress::{Phase, ProgressTracker, RunState};
use rstest::rstest;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::common::{archive_entries, archive_names, page_labels, pdf_bytes, write_file, write_pdf};

fn pipeline(plan: PlanOptions) -> Pipeline {
    Pipeline::new(PipelineOptions {
        plan,
        ..PipelineOptions::default()
    })
}

#[tokio::test]
async fn test_directory_tree_merges_in_natural_order() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "scan10.pdf");
    write_pdf(dir.path(), "scan2.pdf");
    write_pdf(dir.path(), "nested/Scan1.PDF");
    write_file(dir.path(), "notes.txt", b"not a pdf");

    let mut tracker = ProgressTracker::new();
    let outcome = Pipeline::default()
        .run(&[dir.path().to_path_buf()], &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.collected.files, 3);
    assert_eq!(outcome.collected.directories, 2);
    assert_eq!(outcome.collected.skipped, 1);

    let archive = outcome.archive.unwrap();
    let entries = archive_entries(&archive);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "merged_part_1.pdf");
    assert_eq!(page_labels(&entries[0].1), vec!["Scan1 1", "scan2 1", "scan10 1"]);

    assert_eq!(tracker.phase(), Phase::Done);
}

#[tokio::test]
async fn test_small_limit_produces_one_part_per_file() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<_> = ["c.pdf", "a.pdf", "b.pdf"]
        .iter()
        .map(|name| write_pdf(dir.path(), name))
        .collect();

    let mut tracker = ProgressTracker::new();
    let outcome = pipeline(PlanOptions::new(1, Strategy::Overflow))
        .run(&inputs, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    let archive = outcome.archive.unwrap();
    let entries = archive_entries(&archive);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["merged_part_1.pdf", "merged_part_2.pdf", "merged_part_3.pdf"]);

    let labels: Vec<Vec<String>> = entries.iter().map(|(_, pdf)| page_labels(pdf)).collect();
    assert_eq!(labels, vec![vec!["a 1"], vec!["b 1"], vec!["c 1"]]);

    for (summary, (name, bytes)) in outcome.outputs.iter().zip(&entries) {
        assert_eq!(&summary.name, name);
        assert_eq!(summary.byte_length, bytes.len() as u64);
        assert_eq!(summary.page_count, 1);
    }
}

#[tokio::test]
async fn test_progress_events_follow_run_order() {
    let files = vec![
        FileDescriptor::from_bytes("a.pdf", pdf_bytes("a", 2)),
        FileDescriptor::from_bytes("b.pdf", pdf_bytes("b", 1)),
    ];

    let mut tracker = ProgressTracker::new();
    pipeline(PlanOptions::new(1, Strategy::Overflow))
        .run_descriptors(files, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    let states: Vec<&RunState> = tracker.events().iter().map(|e| &e.state).collect();
    assert!(matches!(states[0], RunState::Collecting));
    assert!(matches!(states[1], RunState::Sequencing));
    assert!(matches!(states[2], RunState::Planning));
    assert_eq!(states[3], &RunState::Merging { completed: 0, total: 2 });
    assert_eq!(states[4], &RunState::Merging { completed: 1, total: 2 });
    assert_eq!(states[5], &RunState::Merging { completed: 2, total: 2 });
    assert!(matches!(states[6], RunState::Archiving));
    assert!(matches!(states[7], RunState::Done(_)));

    let percents: Vec<f64> = tracker.events().iter().map(|e| e.percent).collect();
    assert!(percents.windows(2).skip(3).all(|w| w[0] <= w[1]));
    assert_eq!(tracker.percent(), 100.0);
}

#[tokio::test]
async fn test_subscriber_sees_terminal_state() {
    let files = vec![FileDescriptor::from_bytes("a.pdf", pdf_bytes("a", 1))];

    let mut tracker = ProgressTracker::new();
    let receiver = tracker.subscribe();

    Pipeline::default()
        .run_descriptors(files, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(receiver.borrow().state.phase(), Phase::Done);
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_archive_round_trips_through_disk(#[case] compression: CompressionLevel) {
    let dir = TempDir::new().unwrap();
    let inputs = vec![write_pdf(dir.path(), "one.pdf"), write_pdf(dir.path(), "two.pdf")];

    let pipeline = Pipeline::new(PipelineOptions {
        merge: MergeOptions { compression },
        ..PipelineOptions::default()
    });

    let mut tracker = ProgressTracker::new();
    let outcome = pipeline
        .run(&inputs, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    let target = dir.path().join("out/parts.zip");
    let stats = ArchiveWriter::new()
        .save(outcome.archive.unwrap(), &target)
        .await
        .unwrap();

    let written = std::fs::read(&target).unwrap();
    assert_eq!(stats.file_size, written.len() as u64);
    assert_eq!(archive_names(&written), vec!["merged_part_1.pdf"]);

    let (_, pdf) = &archive_entries(&written)[0];
    assert_eq!(page_labels(pdf), vec!["one 1", "two 1"]);
}

#[tokio::test]
async fn test_many_parts_are_zero_padded() {
    let files: Vec<_> = (1..=12)
        .map(|n| FileDescriptor::from_bytes(format!("f{n}.pdf"), pdf_bytes(&format!("f{n}"), 1)))
        .collect();

    let mut tracker = ProgressTracker::new();
    let outcome = pipeline(PlanOptions::new(1, Strategy::Overflow))
        .run_descriptors(files, &mut tracker, &CancellationToken::new())
        .await
        .unwrap();

    let names = archive_names(&outcome.archive.unwrap());
    assert_eq!(names.len(), 12);
    assert_eq!(names[0], "merged_part_01.pdf");
    assert_eq!(names[11], "merged_part_12.pdf");
}
