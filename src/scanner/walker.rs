//! Candidate discovery: a directory walk filtered by a glob pattern.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which turns a glob pattern
//! (with `**` for recursion) into the regular files that should be
//! fingerprinted. The literal leading components of the pattern name the
//! directory to walk with [`walkdir`]; every entry below it is then tested
//! against the compiled [`glob::Pattern`].
//!
//! # Filtering
//!
//! - Directories, sockets and other non-regular entries are skipped
//! - Symbolic links are never followed and never become candidates
//! - Paths that are not valid UTF-8 are reported and skipped
//! - The extension must appear in the configured allow-list (case-insensitive);
//!   an empty allow-list accepts every regular file
//! - Hidden entries (leading `.`) only match patterns that spell out the dot
//!
//! A trailing `**` component is widened to `**/*` so that a bare `**` walks
//! every file below the working directory, not just the directories.
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{Walker, WalkerConfig};
//!
//! let walker = Walker::new("**", WalkerConfig::media_defaults()).unwrap();
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} media files", files.len());
//! ```

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Counters describing what the walker saw and discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries matched by the pattern (files, directories, anything)
    pub matched: usize,
    /// Entries that were not regular files
    pub not_files: usize,
    /// Symbolic links, which are never followed
    pub symlinks: usize,
    /// Regular files rejected by the extension allow-list
    pub skipped_extension: usize,
    /// Entries that could not be read or named while walking
    pub errors: usize,
}

/// Outcome of looking at one entry of the walk.
enum Inspected {
    Accepted(FileEntry),
    Unmatched,
    NotAFile,
    Symlink,
    WrongExtension,
}

/// Pattern-driven candidate producer.
#[derive(Debug)]
pub struct Walker {
    /// Pattern after `**` widening
    pattern: String,
    compiled: Pattern,
    /// Literal directory prefix of the pattern; empty means the working directory
    root: PathBuf,
    /// `None` when the pattern recurses
    max_depth: Option<usize>,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: &str, config: WalkerConfig) -> Result<Self, ScanError> {
        let pattern = widen_recursive(pattern);
        let compiled = Pattern::new(&pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.msg.to_string(),
        })?;
        let (root, max_depth) = split_root(&pattern);

        Ok(Self {
            pattern,
            compiled,
            root,
            max_depth,
            config,
        })
    }

    /// The effective pattern used for matching.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match options mirroring shell globbing.
    fn match_options() -> MatchOptions {
        MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        }
    }

    /// Entries below the pattern root, sorted by name within each directory.
    ///
    /// A root that does not exist matches nothing.
    fn entries(&self) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
        let start = if self.root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.root.as_path()
        };

        let walk = start.exists().then(|| {
            let mut walk = WalkDir::new(start)
                .follow_links(false)
                .min_depth(1)
                .sort_by_file_name();
            if let Some(depth) = self.max_depth {
                walk = walk.max_depth(depth);
            }
            walk
        });

        walk.into_iter().flatten()
    }

    /// Check a file's extension against the allow-list.
    fn passes_extension_filter(&self, path: &Path) -> bool {
        if self.config.extensions.is_empty() {
            return true;
        }

        let extension = path
            .extension()
            .map(|s| format!(".{}", s.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        self.config.extensions.iter().any(|e| *e == extension)
    }

    /// The path a match is reported under: relative patterns give relative paths.
    fn display_path(&self, entry: &DirEntry) -> PathBuf {
        if self.root.as_os_str().is_empty() {
            entry
                .path()
                .strip_prefix(".")
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf())
        } else {
            entry.path().to_path_buf()
        }
    }

    fn inspect(&self, entry: &DirEntry) -> Result<Inspected, ScanError> {
        let path = self.display_path(entry);
        if path.to_str().is_none() {
            return Err(ScanError::NonUtf8Path { path });
        }

        if !self.compiled.matches_path_with(&path, Self::match_options()) {
            return Ok(Inspected::Unmatched);
        }

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return Ok(Inspected::Symlink);
        }
        if !file_type.is_file() {
            return Ok(Inspected::NotAFile);
        }

        if !self.passes_extension_filter(&path) {
            log::trace!("Skipping file due to extension filter: {}", path.display());
            return Ok(Inspected::WrongExtension);
        }

        let metadata = entry.metadata().map_err(|e| walk_error(e, &path))?;

        Ok(Inspected::Accepted(FileEntry::new(path, metadata.len())))
    }

    /// Walk the pattern root, yielding accepted files in discovery order.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        self.entries().filter_map(move |entry| {
            let inspected = entry
                .map_err(|e| {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    walk_error(e, &path)
                })
                .and_then(|entry| self.inspect(&entry));
            match inspected {
                Ok(Inspected::Accepted(file)) => Some(Ok(file)),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            }
        })
    }

    /// Walk the pattern root and collect accepted files, counting what was dropped.
    ///
    /// Unreadable or non-UTF-8 entries are logged and counted, never fatal.
    pub fn collect(&self) -> (Vec<FileEntry>, WalkStats) {
        let mut stats = WalkStats::default();
        let mut files = Vec::new();

        for entry in self.entries() {
            let inspected = match entry {
                Ok(entry) => self.inspect(&entry),
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    Err(walk_error(e, &path))
                }
            };

            if !matches!(inspected, Ok(Inspected::Unmatched)) {
                stats.matched += 1;
            }
            match inspected {
                Ok(Inspected::Accepted(file)) => files.push(file),
                Ok(Inspected::Unmatched) => {}
                Ok(Inspected::NotAFile) => stats.not_files += 1,
                Ok(Inspected::Symlink) => stats.symlinks += 1,
                Ok(Inspected::WrongExtension) => stats.skipped_extension += 1,
                Err(e) => {
                    log::warn!("{}", e);
                    stats.errors += 1;
                }
            }
        }

        log::debug!(
            "Pattern '{}' matched {} entries, {} accepted",
            self.pattern,
            stats.matched,
            files.len()
        );

        (files, stats)
    }
}

fn walk_error(e: walkdir::Error, path: &Path) -> ScanError {
    let message = e.to_string();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
    ScanError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

/// Split a pattern into the directory to walk and how deep to walk it.
///
/// The root is the run of leading components without wildcards, never
/// including the last component. Depth is unbounded if any remaining
/// component is `**`.
fn split_root(pattern: &str) -> (PathBuf, Option<usize>) {
    let components: Vec<Component<'_>> = Path::new(pattern).components().collect();
    let literal = components
        .iter()
        .take(components.len().saturating_sub(1))
        .take_while(|c| !has_wildcard(&c.as_os_str().to_string_lossy()))
        .count();

    let root: PathBuf = components[..literal].iter().collect();
    let rest = &components[literal..];
    let recursive = rest.iter().any(|c| c.as_os_str() == "**");

    (root, (!recursive).then_some(rest.len()))
}

/// Widen a trailing `**` component to `**/*` so it matches files too.
fn widen_recursive(pattern: &str) -> String {
    let trimmed = pattern.trim_end_matches(['/', '\\']);
    if trimmed == "**" || trimmed.ends_with("/**") || trimmed.ends_with("\\**") {
        format!("{trimmed}/*")
    } else {
        pattern.to_string()
    }
}
