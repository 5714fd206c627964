//! File actions module.
//!
//! This module provides functionality for:
//! - Backing up the kept copy of a group before cleanup
//! - Deleting the redundant copies of every duplicate group
//!
//! # Cleanup
//!
//! Cleanup keeps the last file of each group and permanently deletes the
//! others. Deleted files do not go through the system trash.
//!
//! ```no_run
//! use mediadupe::actions::{CleanupConfig, CleanupEngine};
//! use mediadupe::duplicates::DuplicateIndex;
//!
//! let index = DuplicateIndex::new();
//! let report = CleanupEngine::new(CleanupConfig::default()).run(&index).unwrap();
//! assert_eq!(report.total_bytes_freed, 0);
//! ```

pub mod backup;
pub mod cleanup;

pub use backup::{copy_to_backup, prepare_backup_dir, BackupError};
pub use cleanup::{
    check_group, BackupStats, CleanupConfig, CleanupEngine, CleanupError, CleanupReport,
    DeletionFailure, SkippedGroup,
};
