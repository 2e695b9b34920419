//! Turns source file events into history records.
//!
//! The recorder remembers the last recorded text of every file so that edits
//! can be stored as diffs against it.

use crate::diff::{is_one_line_edit, make_diff};
use crate::record::{HistoryEntry, HistoryKind, HistoryRecord};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Produces [`HistoryEntry`] values for file events.
#[derive(Debug, Clone, Default)]
pub struct HistoryRecorder {
    versions: HashMap<String, String>,
    include_one_line_edits: bool,
}

impl HistoryRecorder {
    pub fn new(include_one_line_edits: bool) -> Self {
        Self {
            versions: HashMap::new(),
            include_one_line_edits,
        }
    }

    /// Prime the known version of a file without recording anything.
    pub fn seed(&mut self, file: impl Into<String>, content: impl Into<String>) {
        self.versions.insert(file.into(), content.into());
    }

    /// The last recorded text of a file.
    pub fn known_version(&self, file: &str) -> Option<&str> {
        self.versions.get(file).map(String::as_str)
    }

    /// A file was seen for the first time in this session.
    pub fn opened(&mut self, file: impl Into<String>, content: impl Into<String>) -> HistoryEntry {
        let file = file.into();
        let content = content.into();
        self.versions.insert(file.clone(), content.clone());
        HistoryEntry::new(file, HistoryRecord::complete(content))
    }

    /// A new file was added to the project.
    pub fn added(&mut self, file: impl Into<String>, content: impl Into<String>) -> HistoryEntry {
        self.opened(file, content)
    }

    /// A file was edited.
    ///
    /// Returns `None` when there is nothing worth recording. Skipped edits do
    /// not replace the known version, so the next diff covers them.
    pub fn edited(&mut self, file: &str, content: &str) -> Option<HistoryEntry> {
        let Some(previous) = self.versions.get(file) else {
            debug!(file, "No known version, recording a snapshot");
            return Some(self.opened(file, content));
        };

        if !self.include_one_line_edits && is_one_line_edit(previous, content) {
            trace!(file, "Skipping one-line edit");
            return None;
        }

        let diff = make_diff(previous, content)?;
        self.versions.insert(file.to_string(), content.to_string());
        Some(HistoryEntry::new(file, HistoryRecord::diff(diff)))
    }

    /// A file was renamed. The record's content is the old name.
    pub fn renamed(&mut self, old: &str, new: impl Into<String>) -> HistoryEntry {
        let new = new.into();
        if let Some(content) = self.versions.remove(old) {
            self.versions.insert(new.clone(), content);
        }
        HistoryEntry::new(new, HistoryRecord::new(HistoryKind::Rename, old))
    }

    /// A file was removed from the project.
    pub fn removed(&mut self, file: &str) -> HistoryEntry {
        self.versions.remove(file);
        HistoryEntry::new(file, HistoryRecord::new(HistoryKind::FileDelete, ""))
    }
}
