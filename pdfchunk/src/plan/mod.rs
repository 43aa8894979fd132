//! Chunk planning.
//!
//! Partitions the sequenced files into contiguous, size-bounded chunks in a
//! single greedy left-to-right pass. The planner never splits a file and
//! never rejects one: a file larger than the limit becomes a chunk of its
//! own.
//!
//! Two policies are supported:
//!
//! - [`Strategy::Bounded`] closes the current chunk *before* a file that
//!   would push it past `limit × headroom`.
//! - [`Strategy::Overflow`] adds the file first and closes the chunk once it
//!   has reached the limit, so the crossing file stays in.
//!
//! # Examples
//!
//! ```
//! use pdfchunk::collect::FileDescriptor;
//! use pdfchunk::config::{PlanOptions, Strategy};
//! use pdfchunk::plan::ChunkPlanner;
//!
//! let files = vec![
//!     FileDescriptor::from_bytes("a.pdf", vec![0u8; 5]),
//!     FileDescriptor::from_bytes("b.pdf", vec![0u8; 5]),
//!     FileDescriptor::from_bytes("c.pdf", vec![0u8; 5]),
//! ];
//!
//! let plan = ChunkPlanner::new(PlanOptions::new(10, Strategy::Overflow)).plan(files);
//! assert_eq!(plan.len(), 2);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::collect::FileDescriptor;
use crate::config::{PlanOptions, Strategy};

/// A contiguous group of files merged into one output part.
#[derive(Debug, Clone)]
pub struct Chunk {
    number: usize,
    members: Vec<FileDescriptor>,
    size_bytes: u64,
}

impl Chunk {
    /// 1-based position in the plan.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Members in merge order.
    pub fn members(&self) -> &[FileDescriptor] {
        &self.members
    }

    /// Sum of the members' declared sizes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for chunks produced by the planner.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A single file that alone exceeds the limit.
    pub fn is_oversized(&self, limit_bytes: u64) -> bool {
        self.members.len() == 1 && self.size_bytes > limit_bytes
    }
}

/// Serializable view of one planned chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSummary {
    /// Chunk number.
    pub number: usize,
    /// Member names in order.
    pub files: Vec<String>,
    /// Sum of member sizes.
    pub size_bytes: u64,
    /// Single member larger than the limit.
    pub oversized: bool,
}

/// Serializable view of a whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// Limit the plan was made for.
    pub limit_bytes: u64,
    /// Strategy used.
    pub strategy: Strategy,
    /// Chunks in order.
    pub chunks: Vec<ChunkSummary>,
    /// Sum of all chunk sizes.
    pub total_bytes: u64,
}

/// The planner's output: chunks numbered 1..N.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    chunks: Vec<Chunk>,
    limit_bytes: u64,
    strategy: Strategy,
}

impl ChunkPlan {
    /// Chunks in emission order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when there was nothing to plan.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sum of all chunk sizes; equals the sum of the input sizes.
    pub fn total_bytes(&self) -> u64 {
        self.chunks.iter().map(Chunk::size_bytes).sum()
    }

    /// Limit the plan was made for.
    pub fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }

    /// Strategy the plan was made with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Serializable view of the plan.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            limit_bytes: self.limit_bytes,
            strategy: self.strategy,
            chunks: self
                .chunks
                .iter()
                .map(|chunk| ChunkSummary {
                    number: chunk.number,
                    files: chunk.members.iter().map(|m| m.name().to_string()).collect(),
                    size_bytes: chunk.size_bytes,
                    oversized: chunk.is_oversized(self.limit_bytes),
                })
                .collect(),
            total_bytes: self.total_bytes(),
        }
    }
}

impl IntoIterator for ChunkPlan {
    type Item = Chunk;
    type IntoIter = std::vec::IntoIter<Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

/// Greedy single-pass chunk planner.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPlanner {
    options: PlanOptions,
}

/// Accumulates members and emits numbered chunks.
struct ChunkBuilder {
    chunks: Vec<Chunk>,
    members: Vec<FileDescriptor>,
    size_bytes: u64,
}

impl ChunkBuilder {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            members: Vec::new(),
            size_bytes: 0,
        }
    }

    fn push(&mut self, file: FileDescriptor) {
        self.size_bytes += file.size_bytes();
        self.members.push(file);
    }

    /// Emit the current chunk if it has members.
    fn close(&mut self) {
        if self.members.is_empty() {
            return;
        }

        let chunk = Chunk {
            number: self.chunks.len() + 1,
            members: std::mem::take(&mut self.members),
            size_bytes: std::mem::take(&mut self.size_bytes),
        };

        debug!(
            chunk = chunk.number,
            files = chunk.members.len(),
            size_bytes = chunk.size_bytes,
            "Planned chunk"
        );

        self.chunks.push(chunk);
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.close();
        self.chunks
    }
}

impl ChunkPlanner {
    /// Create a planner.
    pub fn new(options: PlanOptions) -> Self {
        Self { options }
    }

    /// Partition ordered files into chunks.
    ///
    /// Any positive limit and any file size are accepted.
    pub fn plan(&self, files: Vec<FileDescriptor>) -> ChunkPlan {
        let chunks = match self.options.strategy {
            Strategy::Bounded => self.plan_bounded(files),
            Strategy::Overflow => self.plan_overflow(files),
        };

        ChunkPlan {
            chunks,
            limit_bytes: self.options.limit_bytes,
            strategy: self.options.strategy,
        }
    }

    fn plan_bounded(&self, files: Vec<FileDescriptor>) -> Vec<Chunk> {
        let threshold = self.options.bounded_threshold();
        let mut builder = ChunkBuilder::new();

        for file in files {
            let candidate = builder.size_bytes.saturating_add(file.size_bytes());
            if !builder.members.is_empty() && candidate as f64 > threshold {
                builder.close();
            }
            builder.push(file);
        }

        builder.finish()
    }

    fn plan_overflow(&self, files: Vec<FileDescriptor>) -> Vec<Chunk> {
        let limit = self.options.limit_bytes;
        let mut builder = ChunkBuilder::new();

        for file in files {
            builder.push(file);
            if builder.size_bytes >= limit {
                builder.close();
            }
        }

        builder.finish()
    }
}
