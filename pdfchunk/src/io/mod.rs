//! Reading chunk members and writing the finished archive.

pub mod reader;
pub mod writer;

pub use reader::{DocumentReader, ParsedDocument};
pub use writer::{ArchiveWriter, WriteStatistics};
