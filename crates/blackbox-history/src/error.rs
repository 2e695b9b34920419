//! History error types.

use crate::record::{HistoryKind, HistoryRecord};
use thiserror::Error;

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Result type for reconstruction.
pub type ReconstructionResult<T> = Result<T, ReconstructionError>;

/// Result type for history store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A `source_history_type` value that is not one of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown history type: {0}")]
pub struct HistoryKindError(pub String);

/// Errors that can occur while parsing or applying a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The diff text could not be parsed.
    #[error("Malformed diff at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A hunk did not match the text it was applied to.
    #[error("Hunk #{hunk} failed to apply")]
    HunkFailed { hunk: usize },

    /// The diff describes an operation that cannot be applied to text.
    #[error("Unsupported diff operation: {0}")]
    Unsupported(String),
}

impl PatchError {
    /// Create a malformed diff error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors that abort a reconstruction.
///
/// All variants except [`ReconstructionError::EmptySequence`] carry the
/// position and a copy of the record that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    /// There was nothing to reconstruct.
    #[error("History is empty")]
    EmptySequence,

    /// A diff appeared before any full snapshot.
    #[error("Record {index} is a diff with no preceding snapshot")]
    MissingBaseVersion { index: usize, record: HistoryRecord },

    /// Renames and deletions cannot be reconstructed.
    #[error("Record {index} is an unsupported {kind} operation: {detail}")]
    UnsupportedOperation {
        index: usize,
        kind: HistoryKind,
        detail: String,
        record: HistoryRecord,
    },

    /// The diff did not apply to the previous version.
    #[error("Record {index} could not be applied: {source}")]
    PatchApplicationFailure {
        index: usize,
        record: HistoryRecord,
        #[source]
        source: PatchError,
    },
}

impl ReconstructionError {
    /// The record that caused the failure, if any.
    pub fn record(&self) -> Option<&HistoryRecord> {
        match self {
            Self::EmptySequence => None,
            Self::MissingBaseVersion { record, .. }
            | Self::UnsupportedOperation { record, .. }
            | Self::PatchApplicationFailure { record, .. } => Some(record),
        }
    }

    /// Position of the failing record, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::EmptySequence => None,
            Self::MissingBaseVersion { index, .. }
            | Self::UnsupportedOperation { index, .. }
            | Self::PatchApplicationFailure { index, .. } => Some(*index),
        }
    }
}

/// Errors from the SQLite history store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No history recorded for the file.
    #[error("No history for file: {0}")]
    FileNotFound(String),

    /// A stored row has an unrecognised type.
    #[error("Record {id}: {source}")]
    UnknownHistoryType {
        id: i64,
        #[source]
        source: HistoryKindError,
    },
}

impl StoreError {
    /// Create a file not found error.
    pub fn file_not_found(file: impl Into<String>) -> Self {
        Self::FileNotFound(file.into())
    }
}
