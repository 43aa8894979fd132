//! Configuration module for pdfchunk.
//!
//! This module holds the validated, normalized configuration that drives a
//! run. It handles:
//! - Packing strategy and byte limit
//! - Human-readable size parsing
//! - Output compression and naming
//! - Validation of argument combinations

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::archive::OutputNaming;
use crate::error::{PdfChunkError, Result};

/// Fraction of the limit a bounded chunk may fill.
pub const DEFAULT_HEADROOM: f64 = 0.9;

/// Default byte limit per output part (20 MiB).
pub const DEFAULT_LIMIT_BYTES: u64 = 20 * MIB;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Packing policy used by the chunk planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Keep every chunk under `limit × headroom`, except single oversized files.
    #[default]
    Bounded,
    /// Fill a chunk until the limit is met or exceeded, including the crossing file.
    Overflow,
}

impl FromStr for Strategy {
    type Err = PdfChunkError;

    /// Parse a strategy name.
    ///
    /// Accepts "bounded"/"under" and "overflow"/"over", case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bounded" | "under" => Ok(Self::Bounded),
            "overflow" | "over" => Ok(Self::Overflow),
            _ => Err(PdfChunkError::invalid_config(format!(
                "Invalid strategy: {s}. Must be one of: bounded, overflow"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded => write!(f, "bounded"),
            Self::Overflow => write!(f, "overflow"),
        }
    }
}

/// Compression level for the merged parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
    /// No stream compression.
    None,
    /// Compress streams.
    #[default]
    Standard,
    /// Compress streams and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfChunkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfChunkError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// A byte count parsed from a human-readable size.
///
/// Supports:
/// - "20" - bare numbers are mebibytes
/// - "512KB", "512KiB", "512K" - kibibytes
/// - "1.5GB" - fractional values
/// - "1048576B" - exact bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl ByteSize {
    /// Parse a size string.
    ///
    /// # Errors
    ///
    /// Returns an error if the number or unit is invalid, or the size is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfchunk::config::ByteSize;
    ///
    /// assert_eq!(ByteSize::parse("20").unwrap().bytes(), 20 * 1024 * 1024);
    /// assert_eq!(ByteSize::parse("512KiB").unwrap().bytes(), 512 * 1024);
    /// ```
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Size cannot be empty");
        }

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);

        let value: f64 = number
            .parse()
            .with_context(|| format!("Invalid size number: {number:?}"))?;

        let multiplier = match unit.trim().to_lowercase().as_str() {
            "" | "m" | "mb" | "mib" => MIB,
            "b" => 1,
            "k" | "kb" | "kib" => KIB,
            "g" | "gb" | "gib" => GIB,
            other => bail!("Unknown size unit: {other:?}. Use B, KB, MB or GB"),
        };

        let bytes = (value * multiplier as f64).round();
        if !bytes.is_finite() || bytes < 1.0 {
            bail!("Size must be at least one byte: {s}");
        }

        Ok(Self(bytes as u64))
    }

    /// The size in bytes.
    pub fn bytes(self) -> u64 {
        self.0
    }
}

impl FromStr for ByteSize {
    type Err = PdfChunkError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::parse(s)?)
    }
}

/// Inputs to the chunk planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOptions {
    /// Byte limit per chunk.
    pub limit_bytes: u64,

    /// Packing policy.
    pub strategy: Strategy,

    /// Fraction of `limit_bytes` a bounded chunk may fill.
    ///
    /// Merging adds structural bytes, so the bounded strategy keeps some
    /// room below the limit. Ignored by the overflow strategy.
    pub headroom: f64,
}

impl PlanOptions {
    /// Create plan options with the default headroom.
    pub fn new(limit_bytes: u64, strategy: Strategy) -> Self {
        Self {
            limit_bytes,
            strategy,
            headroom: DEFAULT_HEADROOM,
        }
    }

    /// Replace the headroom factor.
    pub fn with_headroom(mut self, headroom: f64) -> Self {
        self.headroom = headroom;
        self
    }

    /// Effective closing threshold of the bounded strategy.
    pub fn bounded_threshold(&self) -> f64 {
        self.limit_bytes as f64 * self.headroom
    }

    /// Validate the plan options.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit is zero or the headroom is not in (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.limit_bytes == 0 {
            return Err(PdfChunkError::invalid_config(
                "Size limit must be greater than zero",
            ));
        }

        if !(self.headroom > 0.0 && self.headroom <= 1.0) {
            return Err(PdfChunkError::invalid_config(format!(
                "Headroom must be in (0, 1], got {}",
                self.headroom
            )));
        }

        Ok(())
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT_BYTES, Strategy::default())
    }
}

/// Complete configuration for a run.
///
/// This structure contains all settings needed to collect, plan, merge and
/// archive, derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, directories or glob patterns.
    pub inputs: Vec<PathBuf>,

    /// Path of the archive to write.
    pub output: PathBuf,

    /// Chunk planning options.
    pub plan: PlanOptions,

    /// Compression applied to each merged part.
    pub compression: CompressionLevel,

    /// Naming scheme for the parts inside the archive.
    pub naming: OutputNaming,

    /// Skip failing parts instead of aborting the run.
    pub continue_on_error: bool,

    /// Plan only, do not merge or write anything.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,
}

impl Config {
    /// Create a configuration with defaults for everything but inputs and output.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output,
            plan: PlanOptions::default(),
            compression: CompressionLevel::default(),
            naming: OutputNaming::default(),
            continue_on_error: false,
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No inputs are specified
    /// - Plan options are invalid
    /// - Verbose and quiet modes are both enabled
    /// - The output path is also an input
    /// - The naming prefix is empty or contains a path separator
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfChunkError::invalid_config("No inputs specified"));
        }

        self.plan.validate()?;

        if self.verbose && self.quiet {
            return Err(PdfChunkError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if self.inputs.iter().any(|input| input == &self.output) {
            return Err(PdfChunkError::invalid_config(format!(
                "Output file cannot be the same as an input: {}",
                self.output.display()
            )));
        }

        self.naming.validate()?;

        Ok(())
    }

    /// Check if output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
