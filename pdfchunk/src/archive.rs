//! Archive assembly.
//!
//! Merged outputs are added to an in-memory ZIP archive in chunk order under
//! deterministic names, then the archive is serialized into a single blob.
//!
//! # Examples
//!
//! ```
//! use pdfchunk::archive::OutputNaming;
//!
//! let naming = OutputNaming::default();
//! assert_eq!(naming.name_for(3, 5), "merged_part_3.pdf");
//! assert_eq!(naming.name_for(3, 12), "merged_part_03.pdf");
//! ```

use std::io::{Cursor, Write};
use tracing::{debug, trace};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use crate::error::{PdfChunkError, Result};
use crate::merge::MergedOutput;

/// Default prefix for output names.
pub const DEFAULT_PREFIX: &str = "merged_part";

/// Naming scheme for outputs inside the archive: `{prefix}_{n}.pdf`.
///
/// `n` is the chunk number zero-padded to the digit width of the chunk
/// count, so alphabetical and natural listings of the archive agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    prefix: String,
}

impl OutputNaming {
    /// Create a naming scheme with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Validate the prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is empty or contains a path separator.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(PdfChunkError::invalid_config(
                "Output name prefix cannot be empty",
            ));
        }

        if self.prefix.contains(['/', '\\']) {
            return Err(PdfChunkError::invalid_config(format!(
                "Output name prefix cannot contain a path separator: {}",
                self.prefix
            )));
        }

        Ok(())
    }

    /// Name of output `number` out of `total`.
    pub fn name_for(&self, number: usize, total: usize) -> String {
        let width = digits(total.max(number));
        format!("{}_{number:0width$}.pdf", self.prefix)
    }
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Builds the archive from merged outputs.
pub struct ArchiveAssembler {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    entries: usize,
    last_chunk: usize,
}

impl ArchiveAssembler {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(true),
            entries: 0,
            last_chunk: 0,
        }
    }

    /// Number of entries added.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// True when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Add one merged output under its name.
    ///
    /// Outputs must arrive in increasing chunk order.
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::SerializationFailed`] with target `"archive"`
    /// if the entry cannot be written or arrives out of order.
    pub fn add(&mut self, output: &MergedOutput) -> Result<()> {
        if output.chunk_number <= self.last_chunk {
            return Err(PdfChunkError::serialization_failed(
                "archive",
                format!(
                    "part {} added after part {}",
                    output.chunk_number, self.last_chunk
                ),
            ));
        }

        self.writer.start_file(output.name.as_str(), self.options)?;
        self.writer
            .write_all(&output.bytes)
            .map_err(|e| PdfChunkError::serialization_failed("archive", e.to_string()))?;

        self.entries += 1;
        self.last_chunk = output.chunk_number;

        trace!(
            name = %output.name,
            bytes = output.byte_length(),
            "Added archive entry"
        );

        Ok(())
    }

    /// Serialize the archive.
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::SerializationFailed`] with target `"archive"`
    /// if the central directory cannot be written.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let bytes = self.writer.finish()?.into_inner();

        debug!(entries = self.entries, bytes = bytes.len(), "Archive serialized");

        Ok(bytes)
    }
}

impl Default for ArchiveAssembler {
    fn default() -> Self {
        Self::new()
    }
}
