//! Scan driver: candidate discovery, fingerprinting and index accumulation.
//!
//! # Pipeline
//!
//! 1. Walk the pattern's root for regular files with an allowed extension
//!    ([`Walker`]), in discovery order.
//! 2. Fingerprint every candidate on a bounded rayon pool. Fingerprinting
//!    has no shared state, so it runs in parallel.
//! 3. Record the results into a [`DuplicateIndex`] sequentially, in
//!    discovery order. Group contents, `size` and the eventual representative
//!    therefore do not depend on which worker finished first.
//!
//! A file that cannot be fingerprinted is logged, counted in
//! [`ScanSummary::errors`] and skipped. It never reaches the index.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::duplicates::{DuplicateFinder, FinderConfig};
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (index, summary) = finder.scan("**").unwrap();
//! println!(
//!     "{} duplicate groups, {} bytes reclaimable",
//!     summary.duplicate_groups, summary.reclaimable_bytes
//! );
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::DuplicateIndex;
use crate::progress::ProgressCallback;
use crate::scanner::{fingerprint_file, FileEntry, HashError, ScanError, Walker, WalkerConfig};

/// Errors that abort a whole scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The candidate pattern could not be used.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The fingerprinting thread pool could not be created.
    #[error("failed to build fingerprint thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for the scan driver.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of threads reading file prefixes.
    pub io_threads: usize,
    /// Extension filtering.
    pub walker_config: WalkerConfig,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::media_defaults(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of fingerprinting threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the extension filter.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Entries produced by the pattern
    pub matched: usize,
    /// Regular files with an accepted extension
    pub candidates: usize,
    /// Regular files rejected by the extension filter
    pub skipped_extension: usize,
    /// Files recorded in the index
    pub indexed: usize,
    /// Entries that could not be inspected or fingerprinted
    pub errors: usize,
    /// Distinct fingerprints
    pub unique_fingerprints: usize,
    /// Groups with two or more files
    pub duplicate_groups: usize,
    /// Files a cleanup would remove
    pub duplicate_files: u64,
    /// Bytes a cleanup would account for
    pub reclaimable_bytes: u64,
    /// Wall-clock duration of the scan
    pub duration: Duration,
}

impl ScanSummary {
    /// Whether some entries had to be skipped because of errors.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.errors > 0
    }

    /// Human-readable reclaimable space (e.g. `1.5 MiB`).
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_bytes).to_string()
    }
}

/// Scan driver producing a [`DuplicateIndex`].
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Scan every file matched by `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the pattern is invalid or the thread pool
    /// cannot be built. Per-file failures are counted, not returned.
    pub fn scan(&self, pattern: &str) -> Result<(DuplicateIndex, ScanSummary), FinderError> {
        let start = Instant::now();

        let walker = Walker::new(pattern, self.config.walker_config.clone())?;
        log::info!("Scanning files matching '{}'", walker.pattern());
        let (files, walk_stats) = walker.collect();

        let (index, mut summary) = self.index_files(files)?;
        summary.matched = walk_stats.matched;
        summary.skipped_extension = walk_stats.skipped_extension;
        summary.errors += walk_stats.errors;
        summary.duration = start.elapsed();

        log::info!(
            "Indexed {} files into {} fingerprints ({} duplicate groups, {} reclaimable) in {:.2?}",
            summary.indexed,
            summary.unique_fingerprints,
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.duration
        );

        Ok((index, summary))
    }

    /// Fingerprint an explicit candidate list and build the index.
    ///
    /// Candidates are recorded in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if the pool cannot be built.
    pub fn index_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(DuplicateIndex, ScanSummary), FinderError> {
        let start = Instant::now();
        let mut summary = ScanSummary {
            candidates: files.len(),
            ..Default::default()
        };

        let fingerprints = self.fingerprint_all(&files)?;

        let mut index = DuplicateIndex::new();
        for (file, result) in files.into_iter().zip(fingerprints) {
            match result {
                Ok(fp) => {
                    index.record(fp, file.path.to_string_lossy(), file.size);
                    summary.indexed += 1;
                }
                Err(e) => {
                    log::warn!("Skipping unreadable file: {}", e);
                    summary.errors += 1;
                }
            }
        }

        summary.unique_fingerprints = index.len();
        summary.duplicate_groups = index.duplicate_group_count();
        summary.duplicate_files = index.duplicate_file_count();
        summary.reclaimable_bytes = index.reclaimable_bytes();
        summary.duration = start.elapsed();

        Ok((index, summary))
    }

    /// Fingerprint files in parallel; the output order matches `files`.
    fn fingerprint_all(
        &self,
        files: &[FileEntry],
    ) -> Result<Vec<Result<String, HashError>>, FinderError> {
        if files.is_empty() {
            log::debug!("No candidates to fingerprint");
            return Ok(Vec::new());
        }

        let callback = self.config.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_phase_start("fingerprint", files.len());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()?;

        let results: Vec<Result<String, HashError>> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = fingerprint_file(&file.path);
                    if let Some(cb) = callback {
                        cb.on_progress(file.path.to_string_lossy().as_ref());
                    }
                    result
                })
                .collect()
        });

        if let Some(cb) = callback {
            cb.on_phase_end("fingerprint");
        }

        Ok(results)
    }
}
