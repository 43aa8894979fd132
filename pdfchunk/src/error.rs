//! Error types for pdfchunk.
//!
//! This module defines all error types that can occur while collecting,
//! planning, merging and archiving documents. Errors carry enough context
//! to tell the user which input file and which output part went wrong.
//!
//! # Error Categories
//!
//! - **Collection Errors**: input not found, unreadable, bad glob pattern
//! - **Parse Errors**: a chunk member is not a usable PDF
//! - **Serialization Errors**: a merged part or the archive failed to serialize
//! - **Output Errors**: the archive cannot be written to disk
//! - **Control Errors**: invalid configuration, cancellation, illegal run state

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::progress::Phase;

/// Result type alias for pdfchunk operations.
pub type Result<T> = std::result::Result<T, PdfChunkError>;

/// Main error type for pdfchunk operations.
#[derive(Debug, Error)]
pub enum PdfChunkError {
    /// Input path was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Input path exists but cannot be accessed.
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input path is neither a regular file nor a directory.
    #[error("Not a file or directory: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// A glob pattern could not be parsed or expanded.
    #[error("Invalid input pattern '{pattern}'\n  Reason: {reason}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The bytes of an input file could not be read.
    #[error("Failed to read input: {origin}\n  Reason: {source}")]
    FailedToReadInput {
        /// Where the bytes were supposed to come from.
        origin: String,
        /// Number of the chunk being merged, once known.
        chunk: Option<usize>,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A chunk member does not parse as a PDF document.
    #[error("Failed to parse '{file}' in part {chunk}\n  Reason: {reason}")]
    ParseFailed {
        /// Number of the chunk being merged.
        chunk: usize,
        /// Name of the offending input file.
        file: String,
        /// Parser message.
        reason: String,
    },

    /// A merged part or the archive could not be serialized.
    #[error("Failed to serialize {target}\n  Reason: {reason}")]
    SerializationFailed {
        /// What was being serialized (an output name or "archive").
        target: String,
        /// Underlying failure.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The run tracker was asked to move along an edge that does not exist.
    #[error("Illegal run state transition: {from} -> {to}")]
    IllegalTransition {
        /// Phase the tracker was in.
        from: Phase,
        /// Phase that was requested.
        to: Phase,
    },

    /// The run was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfChunkError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<zip::result::ZipError> for PdfChunkError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::serialization_failed("archive", err.to_string())
    }
}

impl From<anyhow::Error> for PdfChunkError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(format!("{err:#}"))
    }
}

impl From<tokio::task::JoinError> for PdfChunkError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::other(format!("Background task failed: {err}"))
    }
}

impl PdfChunkError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a ParseFailed error.
    pub fn parse_failed(chunk: usize, file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            chunk,
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationFailed error.
    pub fn serialization_failed(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SerializationFailed {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Name of the input file this error is about, when there is one.
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::ParseFailed { file, .. } => Some(file),
            Self::FailedToReadInput { origin, .. } => Some(origin),
            _ => None,
        }
    }

    /// Chunk number this error is about, when there is one.
    pub fn chunk(&self) -> Option<usize> {
        match self {
            Self::ParseFailed { chunk, .. } => Some(*chunk),
            Self::FailedToReadInput { chunk, .. } => *chunk,
            _ => None,
        }
    }

    /// Attach the chunk number to a read failure that does not carry one yet.
    pub fn in_chunk(self, number: usize) -> Self {
        match self {
            Self::FailedToReadInput {
                origin,
                chunk: None,
                source,
            } => Self::FailedToReadInput {
                origin,
                chunk: Some(number),
                source,
            },
            other => other,
        }
    }

    /// Check if this error is confined to a single chunk.
    ///
    /// Returns true for errors that continue-on-error mode may skip.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed { .. }
                | Self::FailedToReadInput { .. }
                | Self::SerializationFailed { .. }
        ) && !self.is_archive_failure()
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::IllegalTransition { .. }
                | Self::Cancelled
        ) || self.is_archive_failure()
    }

    fn is_archive_failure(&self) -> bool {
        matches!(self, Self::SerializationFailed { target, .. } if target == "archive")
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::InvalidPattern { .. } => 2,
            Self::FailedToReadInput { .. } => 2,
            Self::ParseFailed { .. } => 3,
            Self::SerializationFailed { .. } => 6,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::IllegalTransition { .. } => 70,
            Self::Cancelled => 130, // SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
