//! Backup folder handling for cleanup.
//!
//! # Overview
//!
//! Before the redundant copies of a group are deleted, its representative can
//! be copied into a backup folder. The copy keeps permission bits and the
//! access/modification times of the source.
//!
//! Backups are best-effort: callers report a [`BackupError`] and carry on.
//! Only failing to create the folder itself is fatal, see
//! [`prepare_backup_dir`].

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use thiserror::Error;

/// Error type for copying a representative into the backup folder.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Source and destination are the same file on disk.
    #[error("{src} and {dest} are the same file")]
    SameFile {
        /// File being backed up
        src: PathBuf,
        /// Where it would have been copied to
        dest: PathBuf,
    },

    /// The copy or the metadata transfer failed.
    #[error("failed to copy {src} to {dest}: {source}")]
    Copy {
        /// File being backed up
        src: PathBuf,
        /// Destination path
        dest: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Make sure `dir` exists and is a directory.
///
/// An existing directory is reused. Anything else that prevents creation
/// (a regular file in the way, permissions) is returned as an error.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory cannot be created.
pub fn prepare_backup_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        log::info!(
            "Directory [{}] already exists, using as backup folder",
            dir.display()
        );
        return Ok(());
    }

    fs::create_dir_all(dir)?;
    log::info!("Created backup folder [{}]", dir.display());
    Ok(())
}

/// Destination of `src` inside `backup_dir`: same file name, flat layout.
#[must_use]
pub fn backup_destination(src: &Path, backup_dir: &Path) -> Option<PathBuf> {
    src.file_name().map(|name| backup_dir.join(name))
}

/// Copy `src` into `backup_dir`, preserving permissions and timestamps.
///
/// An existing file with the same name is overwritten.
///
/// # Errors
///
/// - `SameFile` if the destination already is `src`
/// - `Copy` if reading, writing or setting timestamps fails
pub fn copy_to_backup(src: &Path, backup_dir: &Path) -> Result<PathBuf, BackupError> {
    let dest = backup_destination(src, backup_dir).ok_or_else(|| BackupError::Copy {
        src: src.to_path_buf(),
        dest: backup_dir.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
    })?;

    let copy_err = |source: io::Error| BackupError::Copy {
        src: src.to_path_buf(),
        dest: dest.clone(),
        source,
    };

    let src_meta = fs::metadata(src).map_err(copy_err)?;

    if is_same_file(&src_meta, src, &dest) {
        return Err(BackupError::SameFile {
            src: src.to_path_buf(),
            dest: dest.clone(),
        });
    }

    // fs::copy carries the permission bits over
    let bytes = fs::copy(src, &dest).map_err(copy_err)?;
    filetime::set_file_times(
        &dest,
        FileTime::from_last_access_time(&src_meta),
        FileTime::from_last_modification_time(&src_meta),
    )
    .map_err(copy_err)?;

    log::debug!(
        "Backed up {} to {} ({} bytes)",
        src.display(),
        dest.display(),
        bytes
    );
    Ok(dest)
}

#[cfg(unix)]
fn is_same_file(src_meta: &Metadata, _src: &Path, dest: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(dest)
        .map(|d| d.dev() == src_meta.dev() && d.ino() == src_meta.ino())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_same_file(_src_meta: &Metadata, src: &Path, dest: &Path) -> bool {
    match (src.canonicalize(), dest.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
