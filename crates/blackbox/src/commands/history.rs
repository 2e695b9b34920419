//! Viewing reconstructed histories.
//!
//! Reconstruction is all-or-nothing: if any record fails, no version is
//! printed or written.

use anyhow::{bail, Context};
use blackbox_history::{HistoryStore, ReconstructedVersion, Reconstructor};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// List recorded source files.
pub fn handle_files(store: &HistoryStore, json: bool) -> anyhow::Result<()> {
    let files = store.files()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("No source histories recorded.");
        return Ok(());
    }

    println!("{:<48} {:>8} {:<20}", "FILE", "RECORDS", "LAST RECORDED");
    println!("{}", "-".repeat(78));
    for file in files {
        let last = file
            .last_recorded
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<48} {:>8} {:<20}", file.name, file.records, last);
    }
    Ok(())
}

/// Reconstruct a file's history from the store.
pub fn reconstruct_file(
    store: &HistoryStore,
    file: &str,
) -> anyhow::Result<Vec<ReconstructedVersion>> {
    let history = store.load(file)?;
    Reconstructor::new()
        .reconstruct(&history)
        .with_context(|| format!("Failed to reconstruct history of {file}"))
}

/// Pick a single 1-based version out of a reconstruction.
pub fn select_version(
    versions: Vec<ReconstructedVersion>,
    number: usize,
) -> anyhow::Result<ReconstructedVersion> {
    let count = versions.len();
    if number == 0 || number > count {
        bail!("Version {number} does not exist (history has {count} versions)");
    }
    versions
        .into_iter()
        .nth(number - 1)
        .context("Version disappeared from reconstruction")
}

/// Print all versions of a file, or just one.
pub fn handle_show(
    store: &HistoryStore,
    file: &str,
    version: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let versions = reconstruct_file(store, file)?;
    let versions = match version {
        Some(number) => vec![select_version(versions, number)?],
        None => versions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }

    for v in &versions {
        println!("=== {file} version {} ({}) ===", v.index + 1, v.kind);
        print!("{}", v.text);
        if !v.text.is_empty() && !v.text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// File name for the n-th exported version, keeping the source extension.
fn version_file_name(file: &str, number: usize) -> String {
    match Path::new(file).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("v{number:04}.{ext}"),
        None => format!("v{number:04}"),
    }
}

/// Write every version to `dir`, one file per version.
pub async fn export_versions(
    versions: &[ReconstructedVersion],
    file: &str,
    dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(versions.len());
    for v in versions {
        let path = dir.join(version_file_name(file, v.index + 1));
        fs::write(&path, &v.text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    info!(file, count = written.len(), dir = %dir.display(), "Exported versions");
    Ok(written)
}

/// Reconstruct a file's history and export it.
pub async fn handle_export(store: &HistoryStore, file: &str, dir: &Path) -> anyhow::Result<()> {
    let versions = reconstruct_file(store, file)?;
    let written = export_versions(&versions, file, dir).await?;
    println!("Exported {} versions of {file} to {}", written.len(), dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackbox_history::{HistoryEntry, HistoryKind, HistoryRecord};
    use tempfile::TempDir;

    fn store_with_history() -> HistoryStore {
        let store = HistoryStore::in_memory().unwrap();
        store
            .append(&HistoryEntry::new(
                "src/A.java",
                HistoryRecord::complete("class A {}\n"),
            ))
            .unwrap();
        store
            .append(&HistoryEntry::new(
                "src/A.java",
                HistoryRecord::diff("@@ -1,1 +1,1 @@\n-class A {}\n+class A { int x; }\n"),
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_reconstruct_file() {
        let versions = reconstruct_file(&store_with_history(), "src/A.java").unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].text, "class A { int x; }\n");
    }

    #[test]
    fn test_reconstruct_failure_has_context() {
        let store = store_with_history();
        store
            .append(&HistoryEntry::new(
                "src/A.java",
                HistoryRecord::new(HistoryKind::FileDelete, ""),
            ))
            .unwrap();

        let err = reconstruct_file(&store, "src/A.java").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to reconstruct history of src/A.java"));
    }

    #[test]
    fn test_select_version_bounds() {
        let versions = reconstruct_file(&store_with_history(), "src/A.java").unwrap();
        assert!(select_version(versions.clone(), 0).is_err());
        assert!(select_version(versions.clone(), 3).is_err());
        assert_eq!(
            select_version(versions, 1).unwrap().text,
            "class A {}\n"
        );
    }

    #[test]
    fn test_version_file_name() {
        assert_eq!(version_file_name("src/A.java", 3), "v0003.java");
        assert_eq!(version_file_name("Makefile", 12), "v0012");
    }

    #[tokio::test]
    async fn test_export_versions_writes_files() {
        let dir = TempDir::new().unwrap();
        let versions = reconstruct_file(&store_with_history(), "src/A.java").unwrap();

        let written = export_versions(&versions, "src/A.java", &dir.path().join("out"))
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        let second = fs::read_to_string(&written[1]).await.unwrap();
        assert_eq!(second, "class A { int x; }\n");
    }
}
