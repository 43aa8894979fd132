//! Input file descriptors and their lazy byte sources.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{PdfChunkError, Result};

/// Where the bytes of an input file come from.
///
/// Nothing is read until [`ContentSource::read`] is awaited, so a large
/// input set costs one `FileDescriptor` per file rather than its contents.
#[derive(Clone)]
pub enum ContentSource {
    /// A file on disk, read on demand.
    File(PathBuf),
    /// Bytes already held in memory.
    Memory(Arc<[u8]>),
}

impl ContentSource {
    /// Materialize the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfChunkError::FailedToReadInput`] if the file cannot be read.
    pub async fn read(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| PdfChunkError::FailedToReadInput {
                        origin: path.display().to_string(),
                        chunk: None,
                        source,
                    })
            }
            Self::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Human-readable origin, a path or `<memory>`.
    pub fn origin(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory(_) => "<memory>".to_string(),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory(_) => None,
        }
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// One input document: its name, declared size and byte source.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    name: String,
    size_bytes: u64,
    source: ContentSource,
}

impl FileDescriptor {
    /// Create a descriptor from its parts.
    pub fn new(name: impl Into<String>, size_bytes: u64, source: ContentSource) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            source,
        }
    }

    /// Create a descriptor for a file on disk.
    ///
    /// The name is the file's base name; the size is taken as given.
    pub fn from_path(path: PathBuf, size_bytes: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::new(name, size_bytes, ContentSource::File(path))
    }

    /// Create a descriptor over in-memory bytes; the size is their length.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self::new(name, bytes.len() as u64, ContentSource::Memory(bytes))
    }

    /// Name used for ordering and messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Lazy byte source.
    pub fn source(&self) -> &ContentSource {
        &self.source
    }
}
