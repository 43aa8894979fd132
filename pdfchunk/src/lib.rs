//! pdfchunk - Merge PDF files into size-bounded parts bundled in one ZIP.
//!
//! A run walks the input files and directories, orders the PDFs it finds by
//! natural name order, partitions them into chunks whose summed input size
//! stays under a limit, merges each chunk into one document and packs the
//! results into a single archive:
//!
//! 1. [`collect`]: enumerate inputs into [`FileDescriptor`](collect::FileDescriptor)s
//! 2. [`sequence`]: natural, case-insensitive ordering
//! 3. [`plan`]: greedy partitioning under a byte limit
//! 4. [`merge`]: page-preserving merge of each chunk
//! 5. [`archive`]: ZIP assembly with deterministic names
//!
//! [`pipeline::Pipeline`] runs all five and reports through a
//! [`progress::ProgressTracker`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfchunk::Config;
//! use pdfchunk::io::ArchiveWriter;
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
//!
//! if let Some(archive) = outcome.archive {
//!     ArchiveWriter::new().save(archive, &config.output).await?;
//! }
//! println!("{} part(s)", outcome.outputs.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod collect;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod sequence;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{PdfChunkError, Result};

/// Version of the pdfchunk library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the pdfchunk library.
pub const NAME: &str = env!("CARGO_PKG_NAME");
