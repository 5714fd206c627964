//! Duplicate groups and the fingerprint-keyed duplicate index.
//!
//! # Overview
//!
//! Every accepted file is recorded under its fingerprint. A
//! [`DuplicateGroup`] holds the paths sharing one fingerprint in discovery
//! order, plus size bookkeeping:
//!
//! - `count` is always `filenames.len()`
//! - `size` is the on-disk size of the *most recently* recorded file
//! - `total_size` is `size * count`, recomputed on every insertion
//!
//! `size` is last-write-wins rather than a max or a sum, and the
//! representative kept during cleanup is the last path recorded. Both follow
//! from insertion order, so the order in which files are recorded matters.
//!
//! # Example
//!
//! ```
//! use mediadupe::duplicates::DuplicateIndex;
//!
//! let mut index = DuplicateIndex::new();
//! index.record("abc", "a.jpg", 100);
//! index.record("abc", "b.jpg", 120);
//!
//! let group = index.get("abc").unwrap();
//! assert_eq!(group.filenames, vec!["a.jpg", "b.jpg"]);
//! assert_eq!(group.count, 2);
//! assert_eq!(group.size, 120);
//! assert_eq!(group.total_size, 240);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All files sharing one fingerprint.
///
/// Field order here is the field order of the exported document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Paths in discovery order. Repeats are not rejected.
    pub filenames: Vec<String>,
    /// Number of entries in `filenames`
    pub count: u64,
    /// Size in bytes of the last file recorded
    pub size: u64,
    /// `size * count` as of the last insertion
    pub total_size: u64,
}

impl DuplicateGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file, updating count and size bookkeeping.
    pub fn push(&mut self, path: impl Into<String>, size: u64) {
        self.filenames.push(path.into());
        self.count += 1;
        self.size = size;
        self.total_size = self.size * self.count;
    }

    /// Whether this group has something to clean up (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.count > 1
    }

    /// The file kept during cleanup: the last one recorded.
    #[must_use]
    pub fn representative(&self) -> Option<&str> {
        self.filenames.last().map(String::as_str)
    }

    /// Files removed during cleanup: all but the representative.
    #[must_use]
    pub fn redundant(&self) -> &[String] {
        match self.filenames.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Bytes a cleanup of this group would account for.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.size * self.count.saturating_sub(1)
    }

    /// Check the `count` and `total_size` invariants.
    ///
    /// Returns a description of the first violated invariant, if any.
    #[must_use]
    pub fn inconsistency(&self) -> Option<String> {
        if self.count != self.filenames.len() as u64 {
            return Some(format!(
                "count is {} but {} filenames are listed",
                self.count,
                self.filenames.len()
            ));
        }
        if Some(self.total_size) != self.size.checked_mul(self.count) {
            return Some(format!(
                "total_size is {} but size * count is {} * {}",
                self.total_size, self.size, self.count
            ));
        }
        None
    }
}

/// Mapping from fingerprint to [`DuplicateGroup`].
///
/// Keys are kept sorted so exports are stable; key order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateIndex {
    groups: BTreeMap<String, DuplicateGroup>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file under `fingerprint`, creating the group on first sight.
    pub fn record(&mut self, fingerprint: impl Into<String>, path: impl Into<String>, size: u64) {
        self.groups
            .entry(fingerprint.into())
            .or_default()
            .push(path, size);
    }

    /// Look up a group by fingerprint.
    #[must_use]
    pub fn get(&self, fingerprint: &str) -> Option<&DuplicateGroup> {
        self.groups.get(fingerprint)
    }

    /// Insert or replace a whole group.
    pub fn insert(&mut self, fingerprint: impl Into<String>, group: DuplicateGroup) {
        self.groups.insert(fingerprint.into(), group);
    }

    /// Number of distinct fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over `(fingerprint, group)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DuplicateGroup)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over groups holding two or more files.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, &DuplicateGroup)> {
        self.iter().filter(|(_, g)| g.has_duplicates())
    }

    /// Number of groups holding two or more files.
    #[must_use]
    pub fn duplicate_group_count(&self) -> usize {
        self.duplicates().count()
    }

    /// Number of files a cleanup would remove.
    #[must_use]
    pub fn duplicate_file_count(&self) -> u64 {
        self.duplicates().map(|(_, g)| g.count - 1).sum()
    }

    /// Bytes a cleanup would account for across all groups.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups.values().map(DuplicateGroup::reclaimable).sum()
    }

    /// Fingerprints whose group violates the count or total-size invariant.
    #[must_use]
    pub fn inconsistencies(&self) -> Vec<(String, String)> {
        self.groups
            .iter()
            .filter_map(|(k, g)| g.inconsistency().map(|msg| (k.clone(), msg)))
            .collect()
    }
}

impl FromIterator<(String, DuplicateGroup)> for DuplicateIndex {
    fn from_iter<T: IntoIterator<Item = (String, DuplicateGroup)>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
