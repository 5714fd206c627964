//! Export and import of the duplicate index.
//!
//! The exported document is the index itself: a JSON object mapping each
//! fingerprint to its group.
//!
//! ```json
//! {
//!     "900150983cd24fb0d6963f7d28e17f72": {
//!         "filenames": [
//!             "a.jpg",
//!             "b.jpg"
//!         ],
//!         "count": 2,
//!         "size": 1024,
//!         "total_size": 2048
//!     }
//! }
//! ```
//!
//! There is no envelope, checksum or version field. A document produced by
//! one run is assumed to be readable by another.
//!
//! * [`io`]: writing to a sink or file, reading from a reader or file.

pub mod io;

use std::fmt;
use std::path::{Path, PathBuf};

/// Where an exported index goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Standard output
    Stdout,
    /// A file, replaced atomically
    File(PathBuf),
}

impl ExportTarget {
    /// Interpret a CLI argument: `-` means stdout, anything else is a path.
    #[must_use]
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            Self::Stdout
        } else {
            Self::File(arg.to_path_buf())
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Errors that can occur while exporting or importing an index.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// The destination or source could not be written or read.
    #[error("I/O error for {target}: {source}")]
    Io {
        /// File path, or `<stdout>`
        target: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid duplicate index.
    #[error("malformed index document: {0}")]
    Format(#[source] serde_json::Error),
}

impl ExportError {
    pub(crate) fn io(target: impl fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            target: target.to_string(),
            source,
        }
    }
}
