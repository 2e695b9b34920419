//! Diff generation.
//!
//! [`make_diff`] writes the compact hunk format stored in `diff` records: one
//! hunk per change block, removed lines followed by added lines, no context
//! and no file headers. [`unified_diff`] produces a conventional diff for
//! display.

use crate::text::Lines;
use similar::{capture_diff_slices, Algorithm, DiffTag, TextDiff};
use std::ops::Range;

const NO_NEWLINE: &str = "\\ No newline at end of file\n";

/// A contiguous block of changed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChangeBlock {
    old: Range<usize>,
    new: Range<usize>,
}

/// Group the line diff of `old` and `new` into change blocks.
///
/// Block positions are tracked with running cursors over both texts; only the
/// lengths of each op are taken from the diff. Blocks touching the end of
/// either text are widened so that a missing final newline is always visible
/// in the generated hunk.
fn change_blocks(old: &Lines<'_>, new: &Lines<'_>) -> Vec<ChangeBlock> {
    let ops = capture_diff_slices(Algorithm::Myers, &old.lines, &new.lines);
    let mut blocks: Vec<ChangeBlock> = Vec::new();
    let (mut old_pos, mut new_pos) = (0, 0);
    let mut extend = false;

    for op in ops {
        let (old_len, new_len) = match op.tag() {
            DiffTag::Equal => {
                let len = op.old_range().len();
                old_pos += len;
                new_pos += len;
                if len > 0 {
                    extend = false;
                }
                continue;
            }
            DiffTag::Delete => (op.old_range().len(), 0),
            DiffTag::Insert => (0, op.new_range().len()),
            DiffTag::Replace => (op.old_range().len(), op.new_range().len()),
        };

        let old_range = old_pos..old_pos + old_len;
        let new_range = new_pos..new_pos + new_len;
        old_pos = old_range.end;
        new_pos = new_range.end;

        match blocks.last_mut() {
            Some(block) if extend => {
                block.old.end = old_range.end;
                block.new.end = new_range.end;
            }
            _ => blocks.push(ChangeBlock {
                old: old_range,
                new: new_range,
            }),
        }
        extend = true;
    }

    if let Some(last) = blocks.last_mut() {
        let at_end = last.old.end == old.len();
        let hides_newline = (last.new.is_empty() && new.missing_final_newline())
            || (last.old.is_empty() && old.missing_final_newline());
        if at_end && hides_newline && last.old.start > 0 && last.new.start > 0 {
            // Rewrite the preceding (unchanged) line so the marker has a home.
            last.old.start -= 1;
            last.new.start -= 1;
        }
    }

    let touches_end = blocks.last().is_some_and(|b| b.old.end == old.len());
    if !old.is_empty()
        && !new.is_empty()
        && old.trailing_newline != new.trailing_newline
        && !touches_end
    {
        // Only the final newline differs; rewrite the (identical) last line.
        let old_last = old.len() - 1;
        let new_last = new.len() - 1;
        match blocks.last_mut() {
            Some(block) if block.old.end == old_last && block.new.end == new_last => {
                block.old.end = old.len();
                block.new.end = new.len();
            }
            _ => blocks.push(ChangeBlock {
                old: old_last..old.len(),
                new: new_last..new.len(),
            }),
        }
    }

    blocks
}

fn hunk_start(range: &Range<usize>) -> usize {
    if range.is_empty() {
        range.start
    } else {
        range.start + 1
    }
}

/// Generate a compact diff turning `old` into `new`.
///
/// Returns `None` if the texts are identical.
pub fn make_diff(old: &str, new: &str) -> Option<String> {
    if old == new {
        return None;
    }

    let old_lines = Lines::split(old);
    let new_lines = Lines::split(new);
    let mut out = String::new();

    for block in change_blocks(&old_lines, &new_lines) {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            hunk_start(&block.old),
            block.old.len(),
            hunk_start(&block.new),
            block.new.len()
        ));

        for line in &old_lines.lines[block.old.clone()] {
            out.push('-');
            out.push_str(line);
            out.push('\n');
        }
        if !block.old.is_empty()
            && block.old.end == old_lines.len()
            && old_lines.missing_final_newline()
        {
            out.push_str(NO_NEWLINE);
        }

        for line in &new_lines.lines[block.new.clone()] {
            out.push('+');
            out.push_str(line);
            out.push('\n');
        }
        if !block.new.is_empty()
            && block.new.end == new_lines.len()
            && new_lines.missing_final_newline()
        {
            out.push_str(NO_NEWLINE);
        }
    }

    Some(out)
}

/// Whether the change from `old` to `new` replaces exactly one line with
/// exactly one other line.
pub fn is_one_line_edit(old: &str, new: &str) -> bool {
    let old_lines = Lines::split(old);
    let new_lines = Lines::split(new);
    match change_blocks(&old_lines, &new_lines).as_slice() {
        [block] => block.old.len() == 1 && block.new.len() == 1,
        _ => false,
    }
}

/// Generate a unified diff with `context` lines of context and
/// `a/`/`b/` file headers.
pub fn unified_diff(old: &str, new: &str, name: &str, context: usize) -> String {
    if old == new {
        return String::new();
    }

    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(context)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::apply_patch;

    fn assert_round_trip(old: &str, new: &str) {
        let diff = make_diff(old, new).unwrap();
        assert_eq!(apply_patch(old, &diff).unwrap(), new, "diff was:\n{diff}");
    }

    #[test]
    fn test_identical_texts_have_no_diff() {
        assert_eq!(make_diff("a\nb\n", "a\nb\n"), None);
    }

    #[test]
    fn test_single_line_change_format() {
        let diff = make_diff("a\nb\nc\n", "a\nB\nc\n").unwrap();
        assert_eq!(diff, "@@ -2,1 +2,1 @@\n-b\n+B\n");
    }

    #[test]
    fn test_pure_insertion_uses_preceding_line() {
        let diff = make_diff("a\nc\n", "a\nb\nc\n").unwrap();
        assert_eq!(diff, "@@ -1,0 +2,1 @@\n+b\n");
    }

    #[test]
    fn test_insertion_at_start() {
        let diff = make_diff("b\n", "a\nb\n").unwrap();
        assert_eq!(diff, "@@ -0,0 +1,1 @@\n+a\n");
    }

    #[test]
    fn test_missing_newline_is_marked() {
        let diff = make_diff("int x=1;", "int x=2;").unwrap();
        assert_eq!(
            diff,
            "@@ -1,1 +1,1 @@\n-int x=1;\n\\ No newline at end of file\n+int x=2;\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn test_round_trips() {
        assert_round_trip("int x=1;", "int x=2;");
        assert_round_trip("", "class A {}\n");
        assert_round_trip("class A {}\n", "");
        assert_round_trip("a\nb\n", "a\nb");
        assert_round_trip("a\nb", "a\nb\n");
        assert_round_trip("a\nb\nc\n", "a\nc\n");
        assert_round_trip("a\nb", "a");
        assert_round_trip("a", "a\nb");
        assert_round_trip(
            "class A {\n  int x;\n  void f() {}\n}\n",
            "// header\nclass A {\n  int y;\n  void f() {}\n  void g() {}\n}\n",
        );
    }

    #[test]
    fn test_insertion_after_deleted_prefix_is_placed_in_old_text() {
        let old = "b\nb\n\n\na\n";
        let new = "a\na\na\n";
        assert_round_trip(old, new);
    }

    #[test]
    fn test_blank_line_inserted_before_unterminated_line() {
        assert_round_trip("b\nc\n", "c\n\nc");
    }

    /// Every text of up to four lines drawn from `a`, `b` and blank lines,
    /// with and without a final newline.
    fn small_texts() -> Vec<String> {
        let alphabet = ["a", "b", ""];
        let mut line_sets: Vec<Vec<&str>> = vec![Vec::new()];
        let mut frontier = line_sets.clone();
        for _ in 0..4 {
            frontier = frontier
                .iter()
                .flat_map(|lines| {
                    alphabet.iter().map(move |l| {
                        let mut next = lines.clone();
                        next.push(*l);
                        next
                    })
                })
                .collect();
            line_sets.extend(frontier.iter().cloned());
        }

        let mut texts: Vec<String> = line_sets
            .iter()
            .flat_map(|lines| {
                let body = lines.join("\n");
                [body.clone(), format!("{body}\n")]
            })
            .collect();
        texts.sort();
        texts.dedup();
        texts
    }

    #[test]
    fn test_round_trips_all_small_texts() {
        let texts = small_texts();
        for old in &texts {
            for new in &texts {
                match make_diff(old, new) {
                    Some(diff) => assert_eq!(
                        apply_patch(old, &diff).as_deref(),
                        Ok(new.as_str()),
                        "old={old:?} new={new:?} diff:\n{diff}"
                    ),
                    None => assert_eq!(old, new),
                }
            }
        }
    }

    #[test]
    fn test_one_line_edit_detection() {
        assert!(is_one_line_edit("a\nb\nc\n", "a\nB\nc\n"));
        assert!(!is_one_line_edit("a\nb\nc\n", "A\nb\nC\n"));
        assert!(!is_one_line_edit("a\nb\n", "a\nb\nc\n"));
        assert!(!is_one_line_edit("a\n", "a\n"));
    }

    #[test]
    fn test_unified_diff_has_headers_and_applies() {
        let old = "a\nb\nc\n";
        let new = "a\nB\nc\n";
        let diff = unified_diff(old, new, "A.java", 3);
        assert!(diff.starts_with("--- a/A.java\n+++ b/A.java\n"));
        assert!(diff.contains("-b\n+B\n"));
        assert_eq!(apply_patch(old, &diff).unwrap(), new);
    }
}
