//! History record data structures.

use crate::error::HistoryKindError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a stored history record.
///
/// The text forms match the `source_history_type` column written by the
/// collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    /// A full snapshot of the file.
    Complete,
    /// A unified diff against the previous version.
    Diff,
    /// The file was renamed; the content holds the old name.
    Rename,
    /// The file was deleted.
    FileDelete,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Complete => "complete",
            HistoryKind::Diff => "diff",
            HistoryKind::Rename => "rename",
            HistoryKind::FileDelete => "file_delete",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = HistoryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(HistoryKind::Complete),
            "diff" => Ok(HistoryKind::Diff),
            "rename" => Ok(HistoryKind::Rename),
            "file_delete" => Ok(HistoryKind::FileDelete),
            other => Err(HistoryKindError(other.to_string())),
        }
    }
}

/// One stored step of a file's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    kind: HistoryKind,
    content: String,
}

impl HistoryRecord {
    pub fn new(kind: HistoryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// A full snapshot record.
    pub fn complete(content: impl Into<String>) -> Self {
        Self::new(HistoryKind::Complete, content)
    }

    /// A diff record.
    pub fn diff(content: impl Into<String>) -> Self {
        Self::new(HistoryKind::Diff, content)
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A history record tagged with the source file it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Source file name, relative to the project.
    pub file: String,
    pub record: HistoryRecord,
}

impl HistoryEntry {
    pub fn new(file: impl Into<String>, record: HistoryRecord) -> Self {
        Self {
            file: file.into(),
            record,
        }
    }
}

/// The ordered history of a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSequence {
    file: Option<String>,
    records: Vec<HistoryRecord>,
}

impl VersionSequence {
    /// Create a sequence that is not associated with a named file.
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self {
            file: None,
            records,
        }
    }

    /// Create a sequence for a named source file.
    pub fn for_file(file: impl Into<String>, records: Vec<HistoryRecord>) -> Self {
        Self {
            file: Some(file.into()),
            records,
        }
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<HistoryRecord> for VersionSequence {
    fn from_iter<I: IntoIterator<Item = HistoryRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A full-text version derived from a prefix of a [`VersionSequence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedVersion {
    /// Position of the record that produced this version (0-based).
    pub index: usize,
    /// Kind of the record that produced this version.
    pub kind: HistoryKind,
    /// The reconstructed file text.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_kind_round_trips_column_text() {
        for kind in [
            HistoryKind::Complete,
            HistoryKind::Diff,
            HistoryKind::Rename,
            HistoryKind::FileDelete,
        ] {
            assert_eq!(kind.as_str().parse::<HistoryKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_history_kind_rejects_unknown_text() {
        let err = "patch".parse::<HistoryKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown history type: patch");
    }

    #[test]
    fn test_history_kind_serializes_snake_case() {
        let json = serde_json::to_string(&HistoryKind::FileDelete).unwrap();
        assert_eq!(json, "\"file_delete\"");
    }

    #[test]
    fn test_sequence_from_iterator() {
        let seq: VersionSequence = vec![
            HistoryRecord::complete("a\n"),
            HistoryRecord::diff("@@ -1,1 +1,1 @@\n-a\n+b\n"),
        ]
        .into_iter()
        .collect();

        assert_eq!(seq.len(), 2);
        assert!(seq.file().is_none());
        assert_eq!(seq.records()[1].kind(), HistoryKind::Diff);
    }
}
