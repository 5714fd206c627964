//! Logging infrastructure for mediadupe.
//!
//! Structured logging uses the `log` facade and the `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Every notice about copies, deletions and skipped groups is an `info!` or
//! `warn!` record, so the default level shows what a cleanup did. Each line
//! is tagged with the phase that produced it (`scan`, `cleanup`, `index`,
//! `config`). Records from dependencies stay at `warn` unless `-vv` is given.
//!
//! # Example
//!
//! ```rust,no_run
//! use mediadupe::logging::init_logging;
//!
//! // -v
//! init_logging(1, false);
//! log::debug!("visible");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Must be called once, before any logging calls are made.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
///
/// # Panics
///
/// Panics if called more than once, as `env_logger` can only be
/// initialized once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder
            .filter_level(dependency_level(verbose, quiet))
            .filter_module(env!("CARGO_CRATE_NAME"), level);
    }

    configure_format(&mut builder, verbose);
    builder.init();

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!("Logging initialized at level: {:?}", level);
    }
}

/// Map CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Dependencies only get through at warn, or everything at `-vv`.
fn dependency_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0 | 1) => LevelFilter::Warn,
        (false, _) => LevelFilter::Trace,
    }
}

/// Phase tag for a record, derived from its module path.
fn phase(module_path: Option<&str>) -> &'static str {
    let module = module_path.unwrap_or_default();
    let Some(rest) = module.strip_prefix(env!("CARGO_CRATE_NAME")) else {
        return "dep";
    };

    match rest.trim_start_matches("::").split("::").next() {
        Some("scanner" | "duplicates" | "progress") => "scan",
        Some("actions") => "cleanup",
        Some("export") => "index",
        Some("config") => "config",
        _ => "main",
    }
}

/// Debug builds print a timestamp (and the module path with `-v`),
/// release builds only level and message.
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {:<7} {}",
                    timestamp,
                    level,
                    phase(record.module_path()),
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {:<7} {}",
                level,
                phase(record.module_path()),
                record.args()
            )
        });
    }
}
