//! mediadupe - duplicate media finder
//!
//! Groups files by a fingerprint of their leading bytes, exports and imports
//! the resulting index as JSON, and optionally deletes all but one file of
//! every duplicate group.
//!
//! The binary is a thin wrapper around [`run_app`]; the modules can be used
//! directly as a library:
//!
//! ```no_run
//! use mediadupe::duplicates::DuplicateFinder;
//!
//! let (index, summary) = DuplicateFinder::with_defaults().scan("photos/**").unwrap();
//! for (fingerprint, group) in index.duplicates() {
//!     println!("{fingerprint}: {:?}", group.filenames);
//! }
//! println!("{} reclaimable", summary.reclaimable_display());
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod export;
pub mod logging;
pub mod progress;
pub mod scanner;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{CleanupConfig, CleanupEngine, CleanupReport};
use crate::cli::{CleanupArgs, Cli, Commands, ImportArgs, ScanArgs, SummaryFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateIndex, FinderConfig};
use crate::error::ExitCode;
use crate::export::ExportTarget;
use crate::progress::Progress;
use crate::scanner::{normalize_extensions, WalkerConfig};

/// Run the application for parsed command-line arguments.
///
/// Logging must already be initialized.
///
/// # Errors
///
/// Returns an error for every fatal condition: invalid configuration or
/// pattern, unreadable or malformed index, failed export, or a backup
/// folder that cannot be created. Per-file problems only affect the
/// returned [`ExitCode`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    log::debug!("Effective configuration: {:?}", config);

    let (index, mut partial) = match cli.command {
        Commands::Scan(ref args) => run_scan(args, &config, cli.config.as_deref(), cli.quiet)?,
        Commands::Import(ref args) => (run_import(args)?, false),
    };

    let cleanup = cli.command.cleanup_args();
    if cleanup.cleanup {
        let report = run_cleanup(&index, cleanup, &config)?;
        print_report(&report, cleanup.summary)?;
        partial |= !report.all_succeeded();
    }

    Ok(if partial {
        ExitCode::PartialSuccess
    } else if index.duplicate_group_count() == 0 {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    })
}

/// Config values with the scan flags applied on top.
fn scan_settings(args: &ScanArgs, config: &Config) -> Config {
    let mut settings = config.clone();
    if let Some(ref pattern) = args.pattern {
        settings.pattern = pattern.clone();
    }
    if args.all_extensions {
        settings.extensions.clear();
    } else if !args.extensions.is_empty() {
        settings.extensions = normalize_extensions(args.extensions.clone());
    }
    if let Some(threads) = args.io_threads {
        settings.io_threads = usize::from(threads);
    }
    settings
}

/// Build the index from the file system; the flag reports skipped files.
fn run_scan(
    args: &ScanArgs,
    config: &Config,
    config_path: Option<&Path>,
    quiet: bool,
) -> Result<(DuplicateIndex, bool)> {
    let settings = scan_settings(args, config);

    if args.save_config {
        let saved = match config_path {
            Some(path) => settings.save_to(path).map(|()| path.to_path_buf()),
            None => settings.save(),
        }
        .context("Failed to save scan settings")?;
        log::info!("Saved scan settings to {}", saved.display());
    }

    let pattern = settings.pattern.as_str();
    let walker_config = WalkerConfig::new(settings.extensions.clone());
    let io_threads = settings.io_threads;

    let mut finder_config = FinderConfig::default()
        .with_io_threads(io_threads)
        .with_walker_config(walker_config);
    if !quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(quiet)));
    }

    let (index, summary) = DuplicateFinder::new(finder_config)
        .scan(pattern)
        .with_context(|| format!("Failed to scan '{pattern}'"))?;

    if summary.is_partial() {
        log::warn!("{} file(s) could not be read and were skipped", summary.errors);
    }

    if let Some(ref dest) = args.export {
        let target = ExportTarget::from_arg(dest);
        index
            .export(&target)
            .with_context(|| format!("Failed to export results to {target}"))?;
    }

    Ok((index, summary.is_partial()))
}

fn run_import(args: &ImportArgs) -> Result<DuplicateIndex> {
    let index = DuplicateIndex::load(&args.path)
        .with_context(|| format!("Failed to import {}", args.path.display()))?;

    if args.print {
        index
            .write_json(io::stdout().lock())
            .context("Failed to print imported index")?;
    }

    Ok(index)
}

fn run_cleanup(index: &DuplicateIndex, args: &CleanupArgs, config: &Config) -> Result<CleanupReport> {
    let backup_dir = args.backup.clone().or_else(|| config.backup_dir.clone());
    let engine = CleanupEngine::new(CleanupConfig { backup_dir });

    engine.run(index).context("Cleanup aborted")
}

fn print_report(report: &CleanupReport, format: SummaryFormat) -> Result<()> {
    match format {
        SummaryFormat::Text => {
            println!("Total bytes freed by cleanup [{}]", report.total_bytes_freed);
        }
        SummaryFormat::Json => {
            let json =
                serde_json::to_string_pretty(report).context("Failed to encode cleanup report")?;
            println!("{json}");
        }
    }
    Ok(())
}
