//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the mediadupe application.
///
/// - 0: Success (completed normally, duplicates found or cleaned)
/// - 1: General error (bad arguments, unreadable index, backup folder)
/// - 2: No duplicates found (completed normally, nothing to do)
/// - 3: Partial success (some files could not be read or deleted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed and found duplicates.
    Success = 0,
    /// General error: the run was aborted.
    GeneralError = 1,
    /// No duplicates: the run completed but every group holds one file.
    NoDuplicates = 2,
    /// Partial success: the run completed with non-fatal file errors.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "MD000",
            Self::GeneralError => "MD001",
            Self::NoDuplicates => "MD002",
            Self::PartialSuccess => "MD003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "MD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Messages of the underlying causes, outermost first
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
