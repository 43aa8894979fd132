//! Sequencing and planning through the public API.

use pdfchunk::collect::{ContentSource, FileDescriptor};
use pdfchunk::config::{PlanOptions, Strategy};
use pdfchunk::plan::ChunkPlanner;
use pdfchunk::sequence::sequence;
use rstest::rstest;
use std::sync::Arc;

const MB: u64 = 1024 * 1024;

fn sized(name: &str, size_bytes: u64) -> FileDescriptor {
    FileDescriptor::new(name, size_bytes, ContentSource::Memory(Arc::from(Vec::new())))
}

fn chunk_files(planner: &ChunkPlanner, files: Vec<FileDescriptor>) -> Vec<Vec<String>> {
    planner
        .plan(sequence(files))
        .summary()
        .chunks
        .into_iter()
        .map(|chunk| chunk.files)
        .collect()
}

#[test]
fn test_three_fives_bounded_split_apart() {
    let planner = ChunkPlanner::new(PlanOptions::new(10 * MB, Strategy::Bounded));
    let files = vec![sized("c.pdf", 5 * MB), sized("a.pdf", 5 * MB), sized("b.pdf", 5 * MB)];

    assert_eq!(
        chunk_files(&planner, files),
        vec![vec!["a.pdf"], vec!["b.pdf"], vec!["c.pdf"]]
    );
}

#[test]
fn test_three_fives_overflow_pair_up() {
    let planner = ChunkPlanner::new(PlanOptions::new(10 * MB, Strategy::Overflow));
    let files = vec![sized("c.pdf", 5 * MB), sized("a.pdf", 5 * MB), sized("b.pdf", 5 * MB)];

    let plan = planner.plan(sequence(files));
    let sizes: Vec<u64> = plan.chunks().iter().map(|c| c.size_bytes()).collect();
    assert_eq!(sizes, vec![10 * MB, 5 * MB]);
}

#[rstest]
#[case(Strategy::Bounded)]
#[case(Strategy::Overflow)]
fn test_oversized_file_stands_alone(#[case] strategy: Strategy) {
    let planner = ChunkPlanner::new(PlanOptions::new(10 * MB, strategy));
    let plan = planner.plan(vec![sized("huge.pdf", 50 * MB)]);

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.chunks()[0].size_bytes(), 50 * MB);
    assert!(plan.chunks()[0].is_oversized(10 * MB));
    assert!(plan.summary().chunks[0].oversized);
}

#[rstest]
#[case(Strategy::Bounded)]
#[case(Strategy::Overflow)]
fn test_chunks_preserve_natural_order(#[case] strategy: Strategy) {
    let names = [
        "page 10.pdf",
        "Page 2.pdf",
        "page 1.pdf",
        "appendix.pdf",
        "page 21.pdf",
        "page 3.pdf",
    ];
    let files: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| sized(name, (i as u64 + 1) * MB))
        .collect();

    let planner = ChunkPlanner::new(PlanOptions::new(6 * MB, strategy));
    let flattened: Vec<String> = chunk_files(&planner, files).into_iter().flatten().collect();

    assert_eq!(
        flattened,
        vec![
            "appendix.pdf",
            "page 1.pdf",
            "Page 2.pdf",
            "page 3.pdf",
            "page 10.pdf",
            "page 21.pdf",
        ]
    );
}

#[test]
fn test_bounded_chunks_stay_under_threshold() {
    let options = PlanOptions::new(10 * MB, Strategy::Bounded);
    let files: Vec<_> = (0..40)
        .map(|i| sized(&format!("f{i}.pdf"), (i % 7 + 1) * MB / 2))
        .collect();

    let plan = ChunkPlanner::new(options).plan(sequence(files));
    for chunk in plan.chunks() {
        assert!(
            chunk.len() == 1 || chunk.size_bytes() as f64 <= options.bounded_threshold(),
            "chunk {} holds {} bytes",
            chunk.number(),
            chunk.size_bytes()
        );
    }
    assert_eq!(plan.total_bytes(), plan.chunks().iter().map(|c| c.size_bytes()).sum::<u64>());
}
