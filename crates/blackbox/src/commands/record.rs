//! Recording file events into the history store.

use anyhow::Context;
use blackbox_history::{HistoryEntry, HistoryRecorder, HistoryStore, Reconstructor, StoreError};
use std::path::Path;

/// Build the record for the current content of `file`, if any.
///
/// The recorder is seeded with the latest stored version so the new content
/// is stored as a diff against it. Files with no history get a snapshot.
pub fn record_content(
    store: &HistoryStore,
    include_one_line_edits: bool,
    file: &str,
    content: &str,
) -> anyhow::Result<Option<HistoryEntry>> {
    let mut recorder = HistoryRecorder::new(include_one_line_edits);

    match store.load(file) {
        Ok(history) => {
            let latest = Reconstructor::new()
                .latest(&history)
                .with_context(|| format!("Cannot rebuild the latest version of {file}"))?;
            recorder.seed(file, latest);
            Ok(recorder.edited(file, content))
        }
        Err(StoreError::FileNotFound(_)) => Ok(Some(recorder.added(file, content))),
        Err(e) => Err(e.into()),
    }
}

/// Record the on-disk content of `path` as the next version of `file`.
pub async fn handle_record(
    store: &HistoryStore,
    include_one_line_edits: bool,
    file: &str,
    path: &Path,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match record_content(store, include_one_line_edits, file, &content)? {
        Some(entry) => {
            let id = store.append(&entry)?;
            println!("Recorded {} for {file} (#{id})", entry.record.kind());
        }
        None => println!("No changes to record for {file}"),
    }
    Ok(())
}

/// Record that `old` was renamed to `new`.
pub fn handle_rename(store: &HistoryStore, old: &str, new: &str) -> anyhow::Result<()> {
    let entry = HistoryRecorder::default().renamed(old, new);
    let id = store.append(&entry)?;
    println!("Recorded rename {old} -> {new} (#{id})");
    Ok(())
}

/// Record that `file` was deleted.
pub fn handle_delete(store: &HistoryStore, file: &str) -> anyhow::Result<()> {
    let entry = HistoryRecorder::default().removed(file);
    let id = store.append(&entry)?;
    println!("Recorded deletion of {file} (#{id})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackbox_history::HistoryKind;

    #[test]
    fn test_first_record_is_snapshot() {
        let store = HistoryStore::in_memory().unwrap();
        let entry = record_content(&store, true, "A.java", "class A {}\n")
            .unwrap()
            .unwrap();
        assert_eq!(entry.record.kind(), HistoryKind::Complete);
    }

    #[test]
    fn test_later_records_are_diffs_against_latest() {
        let store = HistoryStore::in_memory().unwrap();
        for content in ["class A {\n}\n", "class A {\n  int x;\n}\n", "class A {\n  int y;\n}\n"] {
            if let Some(entry) = record_content(&store, true, "A.java", content).unwrap() {
                store.append(&entry).unwrap();
            }
        }

        let history = store.load("A.java").unwrap();
        let kinds: Vec<_> = history.records().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![HistoryKind::Complete, HistoryKind::Diff, HistoryKind::Diff]
        );
        assert_eq!(
            Reconstructor::new().latest(&history).unwrap(),
            "class A {\n  int y;\n}\n"
        );
    }

    #[test]
    fn test_one_line_edits_can_be_skipped() {
        let store = HistoryStore::in_memory().unwrap();
        let first = record_content(&store, false, "A.java", "a\nb\n").unwrap().unwrap();
        store.append(&first).unwrap();

        assert!(record_content(&store, false, "A.java", "a\nc\n")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_recording_after_rename_fails() {
        let store = HistoryStore::in_memory().unwrap();
        let first = record_content(&store, true, "B.java", "class B {}\n").unwrap().unwrap();
        store.append(&first).unwrap();
        handle_rename(&store, "A.java", "B.java").unwrap();

        let err = record_content(&store, true, "B.java", "class B { }\n").unwrap_err();
        assert!(err.to_string().contains("Cannot rebuild the latest version of B.java"));
    }
}
