//! Diffing two files on disk.

use anyhow::Context;
use blackbox_history::{make_diff, unified_diff};
use std::path::Path;

/// Render the diff between two texts.
///
/// `compact` selects the stored record format instead of a unified diff.
pub fn render_diff(old: &str, new: &str, name: &str, compact: bool, context: usize) -> String {
    if compact {
        make_diff(old, new).unwrap_or_default()
    } else {
        unified_diff(old, new, name, context)
    }
}

/// Print the diff from `old` to `new`.
pub async fn handle_diff(
    old: &Path,
    new: &Path,
    compact: bool,
    context: usize,
) -> anyhow::Result<()> {
    let old_text = tokio::fs::read_to_string(old)
        .await
        .with_context(|| format!("Failed to read {}", old.display()))?;
    let new_text = tokio::fs::read_to_string(new)
        .await
        .with_context(|| format!("Failed to read {}", new.display()))?;

    let name = new
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| new.display().to_string());

    let diff = render_diff(&old_text, &new_text, &name, compact, context);
    if diff.is_empty() {
        println!("Files are identical");
    } else {
        print!("{diff}");
    }
    Ok(())
}
