//! Chunk merging.
//!
//! A chunk's members are read, parsed and appended one after another into a
//! single accumulator document, which is then serialized. Members are
//! processed strictly in order and nothing runs concurrently, so peak memory
//! is one member's parsed document plus the accumulator.

use lopdf::Document;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::CompressionLevel;
use crate::error::{PdfChunkError, Result};
use crate::io::DocumentReader;
use crate::merge::pages::Accumulator;
use crate::plan::Chunk;

/// Options for merging chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Compression applied to each merged document.
    pub compression: CompressionLevel,
}

/// One merged chunk, serialized.
#[derive(Debug, Clone)]
pub struct MergedOutput {
    /// Number of the chunk this output was built from.
    pub chunk_number: usize,

    /// Name of the output inside the archive.
    pub name: String,

    /// Serialized document.
    pub bytes: Vec<u8>,

    /// Pages in the merged document.
    pub page_count: usize,

    /// Members merged into it.
    pub source_count: usize,

    /// Time spent reading, parsing, appending and serializing.
    pub merge_time: Duration,
}

impl MergedOutput {
    /// Length of the serialized document.
    pub fn byte_length(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Byte-less view for reports.
    pub fn summary(&self) -> OutputSummary {
        OutputSummary {
            chunk_number: self.chunk_number,
            name: self.name.clone(),
            byte_length: self.byte_length(),
            page_count: self.page_count,
            source_count: self.source_count,
        }
    }
}

/// Name and size of a produced output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSummary {
    /// Chunk number.
    pub chunk_number: usize,
    /// Name inside the archive.
    pub name: String,
    /// Serialized length.
    pub byte_length: u64,
    /// Pages in the output.
    pub page_count: usize,
    /// Members merged into the output.
    pub source_count: usize,
}

/// Merges chunks into single documents.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    reader: DocumentReader,
    options: MergeOptions,
}

impl MergeEngine {
    /// Create a merge engine.
    pub fn new(options: MergeOptions) -> Self {
        Self {
            reader: DocumentReader::new(),
            options,
        }
    }

    /// Merge every member of `chunk`, in order, into one document named `name`.
    ///
    /// The cancellation token is checked before each member.
    ///
    /// # Errors
    ///
    /// - [`PdfChunkError::FailedToReadInput`] if a member's bytes cannot be read
    /// - [`PdfChunkError::ParseFailed`] if a member is not a usable document
    /// - [`PdfChunkError::SerializationFailed`] if the merged document cannot
    ///   be serialized
    /// - [`PdfChunkError::Cancelled`] if the token fires
    ///
    /// No partial output is produced on error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfchunk::merge::{MergeEngine, MergeOptions};
    /// # use pdfchunk::plan::Chunk;
    /// # use tokio_util::sync::CancellationToken;
    /// # async fn example(chunk: &Chunk) -> Result<(), Box<dyn std::error::Error>> {
    /// let engine = MergeEngine::new(MergeOptions::default());
    /// let output = engine
    ///     .merge_chunk(chunk, "merged_part_1.pdf", &CancellationToken::new())
    ///     .await?;
    /// println!("{}: {} pages", output.name, output.page_count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge_chunk(
        &self,
        chunk: &Chunk,
        name: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<MergedOutput> {
        let name = name.into();
        let start = Instant::now();
        let mut accumulator = Accumulator::new();

        for member in chunk.members() {
            if cancel.is_cancelled() {
                return Err(PdfChunkError::Cancelled);
            }

            let parsed = self.reader.read(member, chunk.number()).await?;
            let appended = accumulator
                .append(parsed.document)
                .map_err(|e| PdfChunkError::parse_failed(chunk.number(), member.name(), e.to_string()))?;

            trace!(
                chunk = chunk.number(),
                file = member.name(),
                pages = appended,
                "Appended member"
            );
        }

        let page_count = accumulator.page_count();
        let document = accumulator.into_document();
        let bytes = serialize(document, self.options.compression, name.clone()).await?;

        let output = MergedOutput {
            chunk_number: chunk.number(),
            name,
            bytes,
            page_count,
            source_count: chunk.len(),
            merge_time: start.elapsed(),
        };

        debug!(
            chunk = output.chunk_number,
            name = %output.name,
            pages = output.page_count,
            bytes = output.byte_length(),
            merge_time = ?output.merge_time,
            "Merged chunk"
        );

        Ok(output)
    }
}

/// Finalize and serialize a document on a blocking thread.
async fn serialize(
    mut document: Document,
    compression: CompressionLevel,
    target: String,
) -> Result<Vec<u8>> {
    task::spawn_blocking(move || {
        match compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => {
                document.compress();
            }
            CompressionLevel::Maximum => {
                document.compress();
                document.prune_objects();
            }
        }

        document.renumber_objects();

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| PdfChunkError::serialization_failed(target, e.to_string()))?;

        Ok(bytes)
    })
    .await?
}
