//! Input collection.
//!
//! Turns the configured inputs (files, directories, glob patterns) into an
//! unordered set of [`FileDescriptor`]s. Directories are walked with an
//! explicit work stack, so tree depth never grows the call stack, and each
//! directory listing is pulled entry by entry until exhausted.
//!
//! # Examples
//!
//! ```no_run
//! use pdfchunk::collect::Collector;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let collector = Collector::new();
//! let (files, stats) = collector.collect(&[PathBuf::from("scans")]).await?;
//! println!("Found {} PDFs in {} directories", files.len(), stats.directories);
//! # Ok(())
//! # }
//! ```

pub mod descriptor;

pub use descriptor::{ContentSource, FileDescriptor};

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::error::{PdfChunkError, Result};
use crate::utils::{self, is_glob_pattern};

/// Counters gathered while collecting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectStats {
    /// PDF files collected.
    pub files: usize,
    /// Directories listed.
    pub directories: usize,
    /// Entries ignored because they are not PDFs.
    pub skipped: usize,
    /// Sum of the collected files' sizes.
    pub total_bytes: u64,
}

/// Enumerates PDF files from paths, directories and glob patterns.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    /// Accept files regardless of extension.
    any_extension: bool,
}

impl Collector {
    /// Create a collector that only keeps `.pdf` files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector that keeps every regular file.
    pub fn accepting_any_extension() -> Self {
        Self {
            any_extension: true,
        }
    }

    /// Collect descriptors for all inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if an input does not exist, cannot be listed, or is
    /// an invalid glob pattern.
    pub async fn collect(&self, inputs: &[PathBuf]) -> Result<(Vec<FileDescriptor>, CollectStats)> {
        let mut files = Vec::new();
        let mut stats = CollectStats::default();

        for input in inputs {
            for root in self.expand_input(input).await? {
                self.collect_root(root, &mut files, &mut stats).await?;
            }
        }

        debug!(
            files = stats.files,
            directories = stats.directories,
            skipped = stats.skipped,
            total_bytes = stats.total_bytes,
            "Collected inputs"
        );

        Ok((files, stats))
    }

    /// Resolve one input to concrete paths, expanding glob patterns.
    async fn expand_input(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if tokio::fs::try_exists(input).await? {
            return Ok(vec![input.to_path_buf()]);
        }

        let pattern = input.to_string_lossy();
        if is_glob_pattern(&pattern) {
            return utils::collect_paths_for_patterns([pattern.as_ref()]);
        }

        Err(PdfChunkError::file_not_found(input.to_path_buf()))
    }

    /// Walk one root, which may be a file or a directory tree.
    async fn collect_root(
        &self,
        root: PathBuf,
        files: &mut Vec<FileDescriptor>,
        stats: &mut CollectStats,
    ) -> Result<()> {
        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|source| PdfChunkError::FileNotAccessible {
                path: root.clone(),
                source,
            })?;

        if metadata.is_file() {
            self.push_file(root, metadata.len(), files, stats);
            return Ok(());
        }

        if !metadata.is_dir() {
            return Err(PdfChunkError::not_a_file(root));
        }

        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            stats.directories += 1;
            trace!(dir = %dir.display(), "Listing directory");

            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|source| PdfChunkError::FileNotAccessible {
                    path: dir.clone(),
                    source,
                })?;

            while let Some(entry) = entries.next_entry().await.map_err(|source| {
                PdfChunkError::FileNotAccessible {
                    path: dir.clone(),
                    source,
                }
            })? {
                let path = entry.path();
                let file_type = entry.file_type().await?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let len = entry.metadata().await?.len();
                    self.push_file(path, len, files, stats);
                } else if file_type.is_symlink() {
                    // Linked files are followed, linked directories are not.
                    match tokio::fs::metadata(&path).await {
                        Ok(target) if target.is_file() => {
                            self.push_file(path, target.len(), files, stats)
                        }
                        _ => stats.skipped += 1,
                    }
                } else {
                    stats.skipped += 1;
                }
            }
        }

        Ok(())
    }

    fn push_file(
        &self,
        path: PathBuf,
        len: u64,
        files: &mut Vec<FileDescriptor>,
        stats: &mut CollectStats,
    ) {
        if !self.any_extension && !utils::has_pdf_extension(&path) {
            trace!(path = %path.display(), "Skipping non-PDF file");
            stats.skipped += 1;
            return;
        }

        stats.files += 1;
        stats.total_bytes += len;
        files.push(FileDescriptor::from_path(path, len));
    }
}
