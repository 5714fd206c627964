//! Scanner module for candidate discovery and content fingerprinting.
//!
//! This module provides functionality for:
//! - Walking the directory named by a glob pattern and matching its entries
//! - Filtering candidates to regular files with an allowed extension
//! - Prefix fingerprinting with MD5
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory walk, pattern matching and candidate filtering
//! - [`fingerprint`]: Bounded-prefix MD5 fingerprints
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{Walker, WalkerConfig};
//!
//! let config = WalkerConfig::new(vec![".jpg".to_string(), ".mp4".to_string()]);
//!
//! let walker = Walker::new("photos/**", config).unwrap();
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use fingerprint::{fingerprint_file, fingerprint_reader, Fingerprint, PREFIX_SIZE};
pub use walker::Walker;

/// Extensions accepted when no allow-list is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".mp4", ".avi", ".lrv", ".thm"];

/// A regular file that survived pattern and extension filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path as found by the walk (relative patterns give relative paths)
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for candidate discovery.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Lowercase extensions including the leading dot (e.g. `.jpg`).
    /// An empty list accepts every regular file.
    pub extensions: Vec<String>,
}

impl WalkerConfig {
    /// Create a configuration from an extension allow-list.
    ///
    /// Entries are normalized: lowercased, and given a leading `.` when missing.
    /// Blank entries are dropped.
    #[must_use]
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions: normalize_extensions(extensions),
        }
    }

    /// Configuration using [`DEFAULT_EXTENSIONS`].
    #[must_use]
    pub fn media_defaults() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect())
    }

    /// Configuration that accepts every regular file.
    #[must_use]
    pub fn accept_all() -> Self {
        Self::default()
    }
}

/// Normalize an extension allow-list to lowercase, dot-prefixed entries.
#[must_use]
pub fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

/// Errors that can occur while producing candidate paths.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The glob pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// A path below the pattern root cannot be represented as UTF-8.
    #[error("Skipping path that is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        /// The offending path
        path: PathBuf,
    },

    /// An I/O error occurred while walking or reading metadata.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: &std::path::Path, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}
