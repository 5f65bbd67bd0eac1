//! Error types for patch operations.

use thiserror::Error;

/// Errors that can occur while parsing or applying a unified diff.
///
/// Every variant is an expected, recoverable failure: the apply entry point
/// converts them into an [`ApplyResult`](crate::ApplyResult) rather than
/// letting them escape to the caller as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A `@@` line was found but did not match the hunk header grammar
    #[error("malformed hunk header at line {line}: '{header}'")]
    MalformedHeader { line: usize, header: String },

    /// The diff structure itself could not be parsed
    #[error("malformed diff at line {line}: {reason}")]
    MalformedDiff { line: usize, reason: String },

    /// A hunk body exceeded the configured size guard
    #[error("hunk {hunk} spans more than {max} lines; refusing to apply")]
    HunkTooLarge { hunk: usize, max: usize },

    /// A context or removal line did not match the file content
    #[error("context mismatch at line {line}: expected '{expected}', found '{actual}'")]
    ContextMismatch {
        line: usize,
        expected: String,
        actual: String,
    },

    /// Hunk start position falls outside the file entirely ("wrong file")
    #[error("hunk {hunk} start line {start} is outside file bounds ({file_lines} lines)")]
    StartOutOfBounds {
        hunk: usize,
        start: usize,
        file_lines: usize,
    },

    /// Hunk walked past the last line of the file ("wrong file version")
    #[error("hunk {hunk} extends beyond end of file")]
    PastEndOfFile { hunk: usize },

    /// The diff contained no hunks at all
    #[error("no valid hunks found in diff")]
    EmptyDiff,
}

/// Result type for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;
