//! Command-line interface definitions for mediadupe.
//!
//! Global options (verbosity, JSON errors, config file) come first, then one
//! of two subcommands producing a duplicate index: `scan` builds it from the
//! file system, `import` reads a previously exported document. Both accept
//! the cleanup options.
//!
//! # Example
//!
//! ```bash
//! # Scan the current tree for media duplicates and save the index
//! mediadupe scan --pattern 'DCIM/**' --export index.json
//!
//! # Clean up later from the saved index, keeping a backup of each kept file
//! mediadupe import index.json --cleanup --backup ./kept
//!
//! # Every extension, index on stdout
//! mediadupe -q scan --all-extensions --export -
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find and clean up duplicate media files by content fingerprint.
///
/// Files are grouped by the MD5 digest of their first 32 KiB. A cleanup
/// keeps the last file of each group and deletes the others.
#[derive(Debug, Parser)]
#[command(name = "mediadupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH", env = "MEDIADUPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan files matching a glob pattern and build a duplicate index
    Scan(ScanArgs),
    /// Load a duplicate index exported by a previous scan
    Import(ImportArgs),
}

impl Commands {
    /// Cleanup options of the selected subcommand.
    #[must_use]
    pub fn cleanup_args(&self) -> &CleanupArgs {
        match self {
            Self::Scan(args) => &args.cleanup,
            Self::Import(args) => &args.cleanup,
        }
    }
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Glob pattern selecting candidate files (default: `**`)
    ///
    /// A trailing `**` matches every file below that directory. Hidden files
    /// are only matched when the pattern names them explicitly.
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Accepted file extension, case-insensitive (can be repeated)
    ///
    /// Defaults to .jpg .mp4 .avi .lrv .thm
    #[arg(short, long = "ext", value_name = "EXT", conflicts_with = "all_extensions")]
    pub extensions: Vec<String>,

    /// Accept files with any extension
    #[arg(long)]
    pub all_extensions: bool,

    /// Number of threads used for fingerprinting (default: 4)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Write the index as JSON to PATH (`-` for stdout)
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Store this scan's pattern, extensions and thread count in the config file
    ///
    /// Writes to the file given with --config, or the platform config file.
    #[arg(long)]
    pub save_config: bool,

    #[command(flatten)]
    pub cleanup: CleanupArgs,
}

/// Arguments for the import subcommand.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Index file written by `scan --export`
    #[arg(value_name = "INDEX_FILE")]
    pub path: PathBuf,

    /// Print the imported index to stdout
    #[arg(long)]
    pub print: bool,

    #[command(flatten)]
    pub cleanup: CleanupArgs,
}

/// Options shared by both subcommands.
#[derive(Debug, Clone, Args)]
pub struct CleanupArgs {
    /// Delete all but one file of every duplicate group
    #[arg(long)]
    pub cleanup: bool,

    /// Copy each kept file into DIR before deleting its duplicates
    #[arg(long, value_name = "DIR", requires = "cleanup")]
    pub backup: Option<PathBuf>,

    /// Format of the cleanup report printed at the end
    #[arg(long, value_enum, default_value = "text")]
    pub summary: SummaryFormat,
}

/// Format of the final cleanup report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// The total freed bytes as a single line
    Text,
    /// The full report as JSON
    Json,
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryFormat::Text => write!(f, "text"),
            SummaryFormat::Json => write!(f, "json"),
        }
    }
}
