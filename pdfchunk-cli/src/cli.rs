//! Command-line arguments.
//!
//! Kept free of library types so `build.rs` can include this file to render
//! the man page.

use clap::Parser;
use std::path::PathBuf;

/// Merge PDF files into size-bounded parts bundled in one ZIP archive.
///
/// Inputs may be files, directories (walked recursively) or glob patterns.
/// PDFs are ordered by natural, case-insensitive name, grouped into chunks
/// whose summed size stays under the limit, and each chunk is merged into
/// one part of the archive.
#[derive(Parser, Debug)]
#[command(name = "pdfchunk")]
#[command(version)]
#[command(about = "Merge PDF files into size-bounded parts bundled in one ZIP archive", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files, directories or glob patterns
    ///
    /// Directories are searched recursively for files ending in `.pdf`.
    ///
    /// Examples:
    ///   pdfchunk scans/ -o parts.zip
    ///   pdfchunk 'invoices/*.pdf' extra.pdf -o parts.zip
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Output ZIP archive path
    #[arg(short, long, value_name = "ZIP")]
    pub output: PathBuf,

    /// Size limit per part (e.g. 20MB, 512KiB, 1.5GB; bare numbers are MB)
    #[arg(short, long, value_name = "SIZE", default_value = "20MB")]
    pub limit: String,

    /// How parts are packed
    ///
    /// - bounded: keep each part under limit × headroom (default)
    /// - overflow: fill each part until it reaches the limit
    #[arg(short, long, value_name = "STRATEGY", default_value = "bounded")]
    #[arg(value_parser = ["bounded", "under", "overflow", "over"])]
    pub strategy: String,

    /// Fraction of the limit a bounded part may fill, in (0, 1]
    ///
    /// Merging adds some bytes on top of the inputs, so parts are planned
    /// a little below the limit. Defaults to 0.9.
    #[arg(long, value_name = "FACTOR")]
    pub headroom: Option<f64>,

    /// Name prefix of the parts inside the archive
    ///
    /// Parts are named `{prefix}_{n}.pdf`. Defaults to `merged_part`.
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Compression level for each part
    ///
    /// - none: No compression
    /// - standard: Compress streams (default)
    /// - maximum: Compress streams and drop unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Skip parts that fail to merge instead of stopping
    ///
    /// The archive then holds the parts that succeeded, under their planned
    /// numbers, and the failures are listed at the end.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Show the plan without merging or writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show the members of each part and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing archive without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing archive
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
