//! Bounded-prefix MD5 fingerprints.
//!
//! # Overview
//!
//! A fingerprint is the lowercase hex MD5 digest of at most the first
//! [`PREFIX_SIZE`] bytes of a file. Media files are routinely several
//! gigabytes, so only the prefix is read.
//!
//! # Guarantee
//!
//! Equal fingerprints mean equal *prefixes*, not equal files. Two files that
//! share their first 32 KiB but differ afterwards fingerprint identically and
//! will be treated as duplicates. This is an accepted approximation; callers
//! that need full-content equality must verify it themselves.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::fingerprint_file;
//! use std::path::Path;
//!
//! let fp = fingerprint_file(Path::new("clip.mp4")).unwrap();
//! assert_eq!(fp.len(), 32);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

use super::HashError;

/// Number of leading bytes that contribute to a fingerprint (32 KiB).
pub const PREFIX_SIZE: u64 = 32_768;

/// Lowercase hex MD5 digest (32 characters).
pub type Fingerprint = String;

/// Fingerprint a file from its first [`PREFIX_SIZE`] bytes.
///
/// Files shorter than the prefix are hashed in full. The file is opened
/// read-only and nothing else is touched.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be opened or read. Errors are not
/// recovered here; the scan driver decides whether to skip the file.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, HashError> {
    let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
    let fp = fingerprint_reader(file).map_err(|e| HashError::from_io(path, e))?;
    log::trace!("Fingerprint {} for {}", fp, path.display());
    Ok(fp)
}

/// Fingerprint the first [`PREFIX_SIZE`] bytes produced by `reader`.
///
/// # Errors
///
/// Propagates any read error from `reader`.
pub fn fingerprint_reader<R: Read>(reader: R) -> std::io::Result<Fingerprint> {
    let mut prefix = Vec::with_capacity(PREFIX_SIZE as usize);
    reader.take(PREFIX_SIZE).read_to_end(&mut prefix)?;

    let mut hasher = Md5::new();
    hasher.update(&prefix);
    Ok(format!("{:x}", hasher.finalize()))
}
