//! Document parsing for chunk members.
//!
//! A member's bytes are materialized from its [`ContentSource`] and parsed on
//! a blocking thread, so a large document never stalls the async runtime.
//!
//! # Examples
//!
//! ```no_run
//! use pdfchunk::collect::FileDescriptor;
//! use pdfchunk::io::reader::DocumentReader;
//!
//! # async fn example(file: FileDescriptor) -> Result<(), Box<dyn std::error::Error>> {
//! let reader = DocumentReader::new();
//! let parsed = reader.read(&file, 1).await?;
//! println!("{} has {} pages", parsed.name, parsed.page_count);
//! # Ok(())
//! # }
//! ```
//!
//! [`ContentSource`]: crate::collect::ContentSource

use lopdf::Document;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::trace;

use crate::collect::FileDescriptor;
use crate::error::{PdfChunkError, Result};

/// A parsed member document.
#[derive(Debug)]
pub struct ParsedDocument {
    /// The parsed document.
    pub document: Document,

    /// Name of the member it came from.
    pub name: String,

    /// Number of pages in page-tree order.
    pub page_count: usize,

    /// Size of the raw bytes.
    pub byte_length: usize,

    /// Time spent parsing.
    pub parse_time: Duration,
}

/// Reads and parses chunk members.
///
/// Documents still encrypted after loading are rejected.
#[derive(Debug, Clone, Default)]
pub struct DocumentReader;

impl DocumentReader {
    /// Create a reader.
    pub fn new() -> Self {
        Self
    }

    /// Materialize and parse one member of chunk `chunk`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::FailedToReadInput`] tagged with `chunk` if the
    /// bytes cannot be read, or [`PdfChunkError::ParseFailed`] naming the member and chunk if
    /// they do not form a usable document.
    pub async fn read(&self, file: &FileDescriptor, chunk: usize) -> Result<ParsedDocument> {
        let bytes = file
            .source()
            .read()
            .await
            .map_err(|e| e.in_chunk(chunk))?;
        self.parse(bytes, chunk, file.name()).await
    }

    /// Parse raw bytes as a document.
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::ParseFailed`] if parsing fails or the document
    /// is encrypted and cannot be opened.
    pub async fn parse(&self, bytes: Vec<u8>, chunk: usize, name: &str) -> Result<ParsedDocument> {
        let name = name.to_string();

        task::spawn_blocking(move || {
            let start = Instant::now();
            let byte_length = bytes.len();

            let document = Document::load_mem(&bytes)
                .map_err(|e| PdfChunkError::parse_failed(chunk, &name, e.to_string()))?;

            if document.is_encrypted() {
                return Err(PdfChunkError::parse_failed(
                    chunk,
                    &name,
                    "document is encrypted",
                ));
            }

            let page_count = document.get_pages().len();
            let parse_time = start.elapsed();

            trace!(chunk, file = %name, page_count, ?parse_time, "Parsed member");

            Ok(ParsedDocument {
                document,
                name,
                page_count,
                byte_length,
                parse_time,
            })
        })
        .await?
    }
}
