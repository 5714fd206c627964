//! Duplicate cleanup: keep one copy per group, delete the rest.
//!
//! # Overview
//!
//! For every group holding more than one file, the engine:
//!
//! 1. Picks the representative: the *last* recorded filename. The others are
//!    the redundant copies.
//! 2. Checks that there is at least one redundant copy and that every file of
//!    the group still exists. If not, the whole group is skipped and nothing
//!    in it is touched.
//! 3. Optionally copies the representative into the backup folder. A failed
//!    backup is reported and does not stop the deletions.
//! 4. Deletes every redundant copy, adding the group's recorded `size` to the
//!    running total for each one.
//!
//! There are no retries and no rollback.
//!
//! # Accounting
//!
//! `total_bytes_freed` is incremented *before* each removal is attempted, so
//! it also counts copies whose deletion then failed. Counters saturate at
//! `u64::MAX` rather than wrapping on oversized imported sizes. Failed bytes are
//! reported separately in [`CleanupReport::bytes_unconfirmed`], and the
//! failures themselves in [`CleanupReport::deletion_failures`].
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::actions::{CleanupConfig, CleanupEngine};
//! use mediadupe::duplicates::DuplicateIndex;
//! use std::path::Path;
//!
//! let index = DuplicateIndex::load(Path::new("index.json")).unwrap();
//! let engine = CleanupEngine::new(CleanupConfig::default().with_backup_dir("backup"));
//! let report = engine.run(&index).unwrap();
//! println!("Total bytes freed by cleanup [{}]", report.total_bytes_freed);
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::backup::{copy_to_backup, prepare_backup_dir, BackupError};
use crate::duplicates::{DuplicateGroup, DuplicateIndex};

/// Error type for cleanup operations.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// The backup folder could not be created. Fatal for the whole run.
    #[error("cannot create backup folder {path}: {source}")]
    BackupDirectory {
        /// Requested backup folder
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Some members of a group are gone, or nothing is left to delete.
    /// The group is skipped as a whole.
    #[error("group of {} is not being cleaned: {} member(s) no longer exist", .representative.as_deref().unwrap_or("<empty>"), .missing.len())]
    MissingMembers {
        /// File that would have been kept
        representative: Option<String>,
        /// Members that no longer exist
        missing: Vec<String>,
    },

    /// Removing a redundant copy failed.
    #[error("failed to delete {path}: {source}")]
    Delete {
        /// File that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Configuration for a cleanup run.
#[derive(Debug, Clone, Default)]
pub struct CleanupConfig {
    /// Folder receiving one representative per cleaned group.
    pub backup_dir: Option<PathBuf>,
}

impl CleanupConfig {
    /// Back up representatives into `dir` before deleting their copies.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }
}

/// A group left untouched because its precondition failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedGroup {
    /// Fingerprint of the group
    pub fingerprint: String,
    /// File that would have been kept
    pub representative: Option<String>,
    /// Members that no longer exist
    pub missing: Vec<String>,
}

/// A redundant copy that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    /// File that could not be removed
    pub path: String,
    /// Error message
    pub error: String,
}

/// Outcome counters for representative backups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackupStats {
    /// Representatives copied into the backup folder
    pub copied: usize,
    /// Representatives that already were the backup file
    pub same_file: usize,
    /// Representatives whose copy failed
    pub failed: usize,
}

/// Result of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Bytes accounted for by attempted deletions
    pub total_bytes_freed: u64,
    /// Part of `total_bytes_freed` whose deletion failed
    pub bytes_unconfirmed: u64,
    /// Groups whose redundant copies were deleted (or attempted)
    pub groups_processed: usize,
    /// Groups left untouched
    pub groups_skipped: Vec<SkippedGroup>,
    /// Files actually removed
    pub files_deleted: usize,
    /// Removals that failed
    pub deletion_failures: Vec<DeletionFailure>,
    /// Backup outcomes
    pub backups: BackupStats,
}

impl CleanupReport {
    /// Whether every attempted deletion succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.deletion_failures.is_empty()
    }

    /// Bytes whose deletion was confirmed.
    #[must_use]
    pub fn bytes_confirmed(&self) -> u64 {
        self.total_bytes_freed.saturating_sub(self.bytes_unconfirmed)
    }

    /// Human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Cleaned {} group(s), deleted {} file(s), freed {}",
            self.groups_processed,
            self.files_deleted,
            bytesize::ByteSize::b(self.total_bytes_freed)
        );
        if !self.groups_skipped.is_empty() {
            text.push_str(&format!(", skipped {} group(s)", self.groups_skipped.len()));
        }
        if !self.all_succeeded() {
            text.push_str(&format!(
                ", {} deletion(s) failed ({} unconfirmed)",
                self.deletion_failures.len(),
                bytesize::ByteSize::b(self.bytes_unconfirmed)
            ));
        }
        text
    }
}

/// Check that a group may be cleaned.
///
/// Returns the representative and the redundant copies.
///
/// # Errors
///
/// Returns [`CleanupError::MissingMembers`] if nothing would be deleted or
/// any member of the group no longer exists as a file.
pub fn check_group(group: &DuplicateGroup) -> Result<(&str, &[String]), CleanupError> {
    let missing: Vec<String> = group
        .filenames
        .iter()
        .filter(|f| !Path::new(f.as_str()).is_file())
        .cloned()
        .collect();

    match group.filenames.split_last() {
        Some((representative, redundant)) if !redundant.is_empty() && missing.is_empty() => {
            Ok((representative.as_str(), redundant))
        }
        _ => Err(CleanupError::MissingMembers {
            representative: group.representative().map(str::to_string),
            missing,
        }),
    }
}

/// Deletes redundant copies across a [`DuplicateIndex`].
#[derive(Debug, Clone, Default)]
pub struct CleanupEngine {
    config: CleanupConfig,
}

impl CleanupEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: CleanupConfig) -> Self {
        Self { config }
    }

    /// Clean every group of `index` that holds more than one file.
    ///
    /// # Errors
    ///
    /// Returns [`CleanupError::BackupDirectory`] if a backup folder is
    /// configured and cannot be created. Per-group and per-file problems are
    /// recorded in the report instead.
    pub fn run(&self, index: &DuplicateIndex) -> Result<CleanupReport, CleanupError> {
        if let Some(ref dir) = self.config.backup_dir {
            prepare_backup_dir(dir).map_err(|source| CleanupError::BackupDirectory {
                path: dir.clone(),
                source,
            })?;
        }

        let mut report = CleanupReport::default();
        for (fingerprint, group) in index.duplicates() {
            self.clean_group(fingerprint, group, &mut report);
        }

        log::info!("{}", report.summary());
        if report.bytes_unconfirmed > 0 {
            log::warn!(
                "{} bytes are counted as freed although their deletion failed",
                report.bytes_unconfirmed
            );
        }

        Ok(report)
    }

    /// Clean one group, recording the outcome in `report`.
    ///
    /// Groups with a single file are ignored.
    pub fn clean_group(&self, fingerprint: &str, group: &DuplicateGroup, report: &mut CleanupReport) {
        if !group.has_duplicates() {
            return;
        }

        let (representative, redundant) = match check_group(group) {
            Ok(parts) => parts,
            Err(CleanupError::MissingMembers {
                representative,
                missing,
            }) => {
                log::warn!(
                    "File [{}] is not being moved as one or more of its copies no longer exist!",
                    representative.as_deref().unwrap_or_default()
                );
                report.groups_skipped.push(SkippedGroup {
                    fingerprint: fingerprint.to_string(),
                    representative,
                    missing,
                });
                return;
            }
            Err(e) => {
                log::warn!("{}", e);
                return;
            }
        };

        if let Some(ref dir) = self.config.backup_dir {
            self.backup(Path::new(representative), dir, report);
        }

        for filename in redundant {
            log::info!("Deleting a copy of [{}]", filename);
            report.total_bytes_freed = report.total_bytes_freed.saturating_add(group.size);

            match delete_copy(Path::new(filename)) {
                Ok(()) => report.files_deleted += 1,
                Err(e) => {
                    log::error!("{}", e);
                    report.bytes_unconfirmed = report.bytes_unconfirmed.saturating_add(group.size);
                    report.deletion_failures.push(DeletionFailure {
                        path: filename.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.groups_processed += 1;
    }

    fn backup(&self, representative: &Path, dir: &Path, report: &mut CleanupReport) {
        log::info!(
            "Copying [{}] to [{}] before deleting",
            representative.display(),
            dir.display()
        );

        match copy_to_backup(representative, dir) {
            Ok(_) => report.backups.copied += 1,
            Err(e @ BackupError::SameFile { .. }) => {
                log::warn!("Copy error [{}]", e);
                report.backups.same_file += 1;
            }
            Err(e) => {
                log::error!("Copy error [{}]", e);
                report.backups.failed += 1;
            }
        }
    }
}

/// Permanently remove one redundant copy.
fn delete_copy(path: &Path) -> Result<(), CleanupError> {
    fs::remove_file(path).map_err(|source| CleanupError::Delete {
        path: path.to_path_buf(),
        source,
    })
}
