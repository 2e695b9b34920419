//! Version reconstruction.
//!
//! Folds a [`VersionSequence`] into the full text of every version it
//! describes. Processing is strictly sequential and aborts on the first
//! failing record; no partial history is ever returned.

use crate::error::{PatchError, ReconstructionError, ReconstructionResult};
use crate::patch::apply_patch;
use crate::record::{HistoryKind, ReconstructedVersion, VersionSequence};
use blackbox_util::TimingGuard;
use tracing::{debug, info, warn};

/// Rebuilds historical file versions from snapshots and diffs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconstructor;

impl Reconstructor {
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct every version in `sequence`.
    ///
    /// On success the result has exactly one entry per input record.
    pub fn reconstruct(
        &self,
        sequence: &VersionSequence,
    ) -> ReconstructionResult<Vec<ReconstructedVersion>> {
        let _timing = TimingGuard::new("reconstruct", sequence.file().unwrap_or("<unnamed>"));

        if sequence.is_empty() {
            return Err(ReconstructionError::EmptySequence);
        }

        let mut current: Option<String> = None;
        let mut versions = Vec::with_capacity(sequence.len());

        for (index, record) in sequence.records().iter().enumerate() {
            let next = match record.kind() {
                HistoryKind::Complete => record.content().to_string(),
                HistoryKind::Diff => {
                    let base = current.as_deref().ok_or_else(|| {
                        ReconstructionError::MissingBaseVersion {
                            index,
                            record: record.clone(),
                        }
                    })?;
                    apply_patch(base, record.content()).map_err(|source| {
                        warn!(index, error = %source, "Diff failed to apply");
                        match source {
                            PatchError::Unsupported(detail) => {
                                ReconstructionError::UnsupportedOperation {
                                    index,
                                    kind: HistoryKind::Diff,
                                    detail,
                                    record: record.clone(),
                                }
                            }
                            source => ReconstructionError::PatchApplicationFailure {
                                index,
                                record: record.clone(),
                                source,
                            },
                        }
                    })?
                }
                kind @ (HistoryKind::Rename | HistoryKind::FileDelete) => {
                    let detail = match kind {
                        HistoryKind::Rename => {
                            format!("renamed from {}", record.content())
                        }
                        _ => "file deleted".to_string(),
                    };
                    return Err(ReconstructionError::UnsupportedOperation {
                        index,
                        kind,
                        detail,
                        record: record.clone(),
                    });
                }
            };

            debug!(index, kind = %record.kind(), bytes = next.len(), "Reconstructed version");
            versions.push(ReconstructedVersion {
                index,
                kind: record.kind(),
                text: next.clone(),
            });
            current = Some(next);
        }

        info!(
            file = sequence.file().unwrap_or("<unnamed>"),
            versions = versions.len(),
            "Reconstructed history"
        );

        Ok(versions)
    }

    /// Reconstruct only the most recent version.
    pub fn latest(&self, sequence: &VersionSequence) -> ReconstructionResult<String> {
        let mut versions = self.reconstruct(sequence)?;
        versions
            .pop()
            .map(|v| v.text)
            .ok_or(ReconstructionError::EmptySequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::make_diff;
    use crate::record::HistoryRecord;

    fn texts(versions: &[ReconstructedVersion]) -> Vec<&str> {
        versions.iter().map(|v| v.text.as_str()).collect()
    }

    #[test]
    fn test_single_snapshot_yields_its_content() {
        let seq = VersionSequence::new(vec![HistoryRecord::complete("class A {}\n")]);
        let versions = Reconstructor::new().reconstruct(&seq).unwrap();
        assert_eq!(texts(&versions), vec!["class A {}\n"]);
        assert_eq!(versions[0].kind, HistoryKind::Complete);
    }

    #[test]
    fn test_snapshot_then_diff() {
        let diff = make_diff("int x=1;", "int x=2;").unwrap();
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("int x=1;"),
            HistoryRecord::diff(diff),
        ]);
        let versions = Reconstructor::new().reconstruct(&seq).unwrap();
        assert_eq!(texts(&versions), vec!["int x=1;", "int x=2;"]);
    }

    #[test]
    fn test_later_snapshot_replaces_current_text() {
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("a\n"),
            HistoryRecord::diff("@@ -1,1 +1,1 @@\n-a\n+b\n"),
            HistoryRecord::complete("z\n"),
            HistoryRecord::diff("@@ -1,0 +2,1 @@\n+y\n"),
        ]);
        let versions = Reconstructor::new().reconstruct(&seq).unwrap();
        assert_eq!(texts(&versions), vec!["a\n", "b\n", "z\n", "z\ny\n"]);
        assert_eq!(
            versions.iter().map(|v| v.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_leading_diff_is_missing_base() {
        let record = HistoryRecord::diff("@@ -0,0 +1,1 @@\n+a\n");
        let seq = VersionSequence::new(vec![record.clone()]);
        let err = Reconstructor::new().reconstruct(&seq).unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::MissingBaseVersion { index: 0, record }
        );
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let err = Reconstructor::new()
            .reconstruct(&VersionSequence::default())
            .unwrap_err();
        assert_eq!(err, ReconstructionError::EmptySequence);
    }

    #[test]
    fn test_rename_record_is_unsupported() {
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("class A {}\n"),
            HistoryRecord::new(HistoryKind::Rename, "A.java"),
        ]);
        let err = Reconstructor::new().reconstruct(&seq).unwrap_err();
        assert!(matches!(
            err,
            ReconstructionError::UnsupportedOperation {
                index: 1,
                kind: HistoryKind::Rename,
                ..
            }
        ));
    }

    #[test]
    fn test_delete_record_is_unsupported() {
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("class A {}\n"),
            HistoryRecord::new(HistoryKind::FileDelete, ""),
        ]);
        let err = Reconstructor::new().reconstruct(&seq).unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn test_failing_diff_aborts_whole_reconstruction() {
        let bad = HistoryRecord::diff("@@ -1,1 +1,1 @@\n-nope\n+yes\n");
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("a\n"),
            bad.clone(),
            HistoryRecord::complete("b\n"),
        ]);
        let err = Reconstructor::new().reconstruct(&seq).unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::PatchApplicationFailure {
                index: 1,
                record: bad,
                source: PatchError::HunkFailed { hunk: 1 },
            }
        );
    }

    #[test]
    fn test_rename_diff_is_unsupported() {
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("a\n"),
            HistoryRecord::diff("rename from A.java\nrename to B.java\n"),
        ]);
        let err = Reconstructor::new().reconstruct(&seq).unwrap_err();
        assert!(matches!(
            err,
            ReconstructionError::UnsupportedOperation {
                index: 1,
                kind: HistoryKind::Diff,
                ..
            }
        ));
    }

    #[test]
    fn test_latest_returns_final_text() {
        let seq = VersionSequence::new(vec![
            HistoryRecord::complete("a\n"),
            HistoryRecord::diff("@@ -1,1 +1,1 @@\n-a\n+b\n"),
        ]);
        assert_eq!(Reconstructor::new().latest(&seq).unwrap(), "b\n");
    }
}
