//! Archive persistence.
//!
//! Writes the serialized archive to disk atomically: the bytes go to a
//! temporary sibling first and are renamed into place once flushed, so a
//! crashed or cancelled run never leaves a truncated archive behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfchunk::io::writer::ArchiveWriter;
//! use std::path::Path;
//!
//! # async fn example(archive: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = ArchiveWriter::new();
//! let stats = writer.save(archive, Path::new("parts.zip")).await?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::error::{PdfChunkError, Result};
use crate::utils::format_file_size;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes archive bytes to disk.
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    /// Write to a temporary file, then rename.
    atomic: bool,

    /// Buffer size for writing (in bytes).
    buffer_size: usize,
}

impl ArchiveWriter {
    /// Create a writer with atomic writes.
    pub fn new() -> Self {
        Self {
            atomic: true,
            buffer_size: 64 * 1024,
        }
    }

    /// Create a writer that writes straight to the target path.
    pub fn non_atomic() -> Self {
        Self {
            atomic: false,
            ..Self::new()
        }
    }

    /// Save archive bytes to `path`, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written or renamed.
    pub async fn save(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let atomic = self.atomic;
        let buffer_size = self.buffer_size;

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            if let Some(parent) = path_buf.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PdfChunkError::FailedToCreateOutput {
                        path: parent.to_path_buf(),
                        source: e,
                    }
                })?;
            }

            let write_path = if atomic {
                temp_path_for(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                PdfChunkError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            write_or_discard(
                std::io::BufWriter::with_capacity(buffer_size, file),
                &bytes,
                &write_path,
                atomic,
            )?;

            if atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    // Best effort; the rename error is the one worth reporting.
                    let _ = std::fs::remove_file(&write_path);
                    PdfChunkError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            Ok::<_, PdfChunkError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await??;

        debug!(
            path = %stats.output_path.display(),
            bytes = stats.file_size,
            "Archive written"
        );

        Ok(stats)
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    /// Check that the output's parent directory, if it exists, is writable.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent exists but is read-only or inaccessible.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        match tokio::fs::metadata(parent).await {
            Ok(metadata) if metadata.permissions().readonly() => {
                Err(PdfChunkError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PdfChunkError::FileNotAccessible {
                path: parent.to_path_buf(),
                source: e,
            }),
        }
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write and flush `bytes`, removing `path` on failure when `discard` is set.
fn write_or_discard(mut writer: impl Write, bytes: &[u8], path: &Path, discard: bool) -> Result<()> {
    let result = writer.write_all(bytes).and_then(|()| writer.flush());
    drop(writer);

    result.map_err(|e| {
        if discard {
            let _ = std::fs::remove_file(path);
        }
        PdfChunkError::FailedToWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Temporary sibling of `path`: `parts.zip` becomes `.parts.zip.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!(".{file_name}.tmp"))
}
