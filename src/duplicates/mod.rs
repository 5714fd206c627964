//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Accumulating fingerprinted files into duplicate groups
//! - Driving a scan from a glob pattern to a finished index

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{DuplicateGroup, DuplicateIndex};
