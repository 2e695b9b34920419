//! Source history reconstruction for the Blackbox viewer.
//!
//! A source file's history is stored as an ordered list of records, each
//! either a full snapshot or a diff against the previous version. This crate
//! provides:
//! - The history record model
//! - In-process unified diff parsing and application
//! - Diff generation in the compact format the collector stores
//! - Reconstruction of every historical version of a file
//! - A recorder that turns file events into records
//! - SQLite storage for histories
//!
//! # Example
//!
//! ```
//! use blackbox_history::{make_diff, HistoryRecord, Reconstructor, VersionSequence};
//!
//! let diff = make_diff("int x=1;", "int x=2;").unwrap();
//! let history = VersionSequence::new(vec![
//!     HistoryRecord::complete("int x=1;"),
//!     HistoryRecord::diff(diff),
//! ]);
//!
//! let versions = Reconstructor::new().reconstruct(&history).unwrap();
//! assert_eq!(versions[1].text, "int x=2;");
//! ```

mod diff;
mod error;
mod patch;
mod reconstruct;
mod record;
mod recorder;
mod store;
mod text;

pub use diff::{is_one_line_edit, make_diff, unified_diff};
pub use error::{
    HistoryKindError, PatchError, PatchResult, ReconstructionError, ReconstructionResult,
    StoreError, StoreResult,
};
pub use patch::{apply_patch, Hunk, HunkLine, UnifiedDiff};
pub use reconstruct::Reconstructor;
pub use record::{HistoryEntry, HistoryKind, HistoryRecord, ReconstructedVersion, VersionSequence};
pub use recorder::HistoryRecorder;
pub use store::{HistoryStore, SourceFileSummary};
