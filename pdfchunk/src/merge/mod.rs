//! Merging chunk members into single documents.

pub mod merger;
pub mod pages;

pub use merger::{MergeEngine, MergeOptions, MergedOutput, OutputSummary};
pub use pages::Accumulator;
