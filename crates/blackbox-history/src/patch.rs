//! Unified diff parsing and in-process application.
//!
//! Accepts conventional unified diffs (with or without `---`/`+++` headers and
//! context lines) as well as the compact, header-less hunks written by the
//! collector:
//!
//! ```text
//! @@ -3,1 +3,2 @@
//! -int x = 1;
//! +int x = 2;
//! +int y = 3;
//! ```
//!
//! Hunks that do not match at their declared position are searched for at the
//! nearest offset, the way `patch` does. There is no fuzz: every context and
//! removed line must match exactly.

use crate::error::{PatchError, PatchResult};
use crate::text::{self, Lines};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

const NO_NEWLINE_MARKER: char = '\\';

/// Header lines that describe file-level operations we cannot express as text.
const UNSUPPORTED_HEADERS: &[&str] = &[
    "rename from ",
    "rename to ",
    "copy from ",
    "copy to ",
    "deleted file mode",
    "+++ /dev/null",
];

static HUNK_HEADER: OnceLock<Regex> = OnceLock::new();

fn hunk_header() -> &'static Regex {
    HUNK_HEADER.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// A single line of a hunk body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkLine<'a> {
    Context(&'a str),
    Remove(&'a str),
    Add(&'a str),
}

/// One `@@ ... @@` block of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk<'a> {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<HunkLine<'a>>,
    /// The last old-side line has no terminating newline.
    pub old_missing_newline: bool,
    /// The last new-side line has no terminating newline.
    pub new_missing_newline: bool,
}

impl<'a> Hunk<'a> {
    fn old_side(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().filter_map(|line| match line {
            HunkLine::Context(s) | HunkLine::Remove(s) => Some(*s),
            HunkLine::Add(_) => None,
        })
    }

    fn new_side(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().filter_map(|line| match line {
            HunkLine::Context(s) | HunkLine::Add(s) => Some(*s),
            HunkLine::Remove(_) => None,
        })
    }

    /// Index in the base text where the old side is expected to start.
    fn declared_index(&self) -> usize {
        if self.old_count == 0 {
            // Pure insertion: `-k,0` inserts after line k.
            self.old_start
        } else {
            self.old_start - 1
        }
    }

    fn remaining(&self) -> (usize, usize) {
        let old = self.old_side().count();
        let new = self.new_side().count();
        (self.old_count - old, self.new_count - new)
    }
}

/// A parsed unified diff for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiff<'a> {
    hunks: Vec<Hunk<'a>>,
}

impl<'a> UnifiedDiff<'a> {
    /// Parse diff text.
    pub fn parse(diff: &'a str) -> PatchResult<Self> {
        let mut raw_lines: Vec<&str> = diff.split('\n').collect();
        if diff.ends_with('\n') {
            raw_lines.pop();
        }
        let total = raw_lines.len();

        let mut hunks: Vec<Hunk<'a>> = Vec::new();
        let mut open = false;

        for (idx, line) in raw_lines.into_iter().enumerate() {
            let line_no = idx + 1;

            if line.starts_with(NO_NEWLINE_MARKER) {
                let hunk = hunks.last_mut().ok_or_else(|| {
                    PatchError::malformed(line_no, "newline marker outside a hunk")
                })?;
                match hunk.lines.last() {
                    Some(HunkLine::Context(_)) => {
                        hunk.old_missing_newline = true;
                        hunk.new_missing_newline = true;
                    }
                    Some(HunkLine::Remove(_)) => hunk.old_missing_newline = true,
                    Some(HunkLine::Add(_)) => hunk.new_missing_newline = true,
                    None => {
                        return Err(PatchError::malformed(
                            line_no,
                            "newline marker before any hunk line",
                        ))
                    }
                }
                continue;
            }

            if open {
                let hunk = hunks
                    .last_mut()
                    .ok_or_else(|| PatchError::malformed(line_no, "hunk body without header"))?;
                let (old_left, new_left) = hunk.remaining();
                let parsed = match line.chars().next() {
                    Some(' ') => HunkLine::Context(&line[1..]),
                    None => HunkLine::Context(""),
                    Some('-') => HunkLine::Remove(&line[1..]),
                    Some('+') => HunkLine::Add(&line[1..]),
                    Some(_) => {
                        return Err(PatchError::malformed(
                            line_no,
                            format!("unexpected line in hunk: {line:?}"),
                        ))
                    }
                };
                let fits = match parsed {
                    HunkLine::Context(_) => old_left > 0 && new_left > 0,
                    HunkLine::Remove(_) => old_left > 0,
                    HunkLine::Add(_) => new_left > 0,
                };
                if !fits {
                    return Err(PatchError::malformed(
                        line_no,
                        "hunk body longer than its header declares",
                    ));
                }
                hunk.lines.push(parsed);
                open = hunk.remaining() != (0, 0);
                continue;
            }

            if line.starts_with("@@") {
                let hunk = parse_header(line, line_no, total - line_no)?;
                trace!(
                    old_start = hunk.old_start,
                    old_count = hunk.old_count,
                    new_count = hunk.new_count,
                    "Parsed hunk header"
                );
                open = hunk.remaining() != (0, 0);
                hunks.push(hunk);
                continue;
            }

            if let Some(header) = UNSUPPORTED_HEADERS.iter().find(|h| line.starts_with(**h)) {
                return Err(PatchError::Unsupported(header.trim().to_string()));
            }

            // Anything else outside a hunk is a file header or commentary.
        }

        if open {
            return Err(PatchError::malformed(
                diff.split('\n').count(),
                "diff ends in the middle of a hunk",
            ));
        }
        if hunks.is_empty() {
            return Err(PatchError::malformed(0, "no hunks found"));
        }

        Ok(Self { hunks })
    }

    pub fn hunks(&self) -> &[Hunk<'a>] {
        &self.hunks
    }

    /// Apply the diff to `base`, producing the patched text.
    pub fn apply(&self, base: &str) -> PatchResult<String> {
        let source = Lines::split(base);
        let src = &source.lines;

        let mut out: Vec<&str> = Vec::with_capacity(src.len());
        let mut cursor = 0;
        let mut offset: isize = 0;
        let mut trailing_newline = source.is_empty() || source.trailing_newline;

        for (idx, hunk) in self.hunks.iter().enumerate() {
            let number = idx + 1;
            let old: Vec<&str> = hunk.old_side().collect();
            let declared = hunk.declared_index();
            let expected = isize::try_from(declared)
                .ok()
                .and_then(|d| d.checked_add(offset))
                .ok_or(PatchError::HunkFailed { hunk: number })?;

            let pos = locate(src, &old, expected, cursor).ok_or(PatchError::HunkFailed { hunk: number })?;
            if pos as isize != expected {
                debug!(
                    hunk = number,
                    offset = pos as isize - declared as isize,
                    "Hunk applied at offset"
                );
            }

            out.extend_from_slice(&src[cursor..pos]);
            out.extend(hunk.new_side());
            cursor = pos + old.len();
            offset = pos as isize - declared as isize;

            if cursor == src.len() {
                trailing_newline = hunk.new_count == 0 || !hunk.new_missing_newline;
            }
        }

        out.extend_from_slice(&src[cursor..]);
        Ok(text::join(&out, trailing_newline))
    }
}

/// Parse a hunk header. `body_limit` is the number of diff lines left after
/// the header; neither side of the hunk can be longer than that.
fn parse_header<'a>(line: &str, line_no: usize, body_limit: usize) -> PatchResult<Hunk<'a>> {
    let caps = hunk_header()
        .captures(line)
        .ok_or_else(|| PatchError::malformed(line_no, format!("bad hunk header: {line:?}")))?;

    let number = |i: usize, default: usize| -> PatchResult<usize> {
        match caps.get(i) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| PatchError::malformed(line_no, "hunk range out of range")),
            None => Ok(default),
        }
    };

    let old_start = number(1, 0)?;
    let old_count = number(2, 1)?;
    let new_start = number(3, 0)?;
    let new_count = number(4, 1)?;

    if old_start == 0 && old_count > 0 {
        return Err(PatchError::malformed(line_no, "hunk starts at line 0"));
    }
    if old_count > body_limit || new_count > body_limit {
        return Err(PatchError::malformed(
            line_no,
            "hunk header declares more lines than the diff contains",
        ));
    }
    if isize::try_from(old_start).is_err() || isize::try_from(new_start).is_err() {
        return Err(PatchError::malformed(line_no, "hunk range out of range"));
    }

    Ok(Hunk {
        old_start,
        old_count,
        new_start,
        new_count,
        lines: Vec::new(),
        old_missing_newline: false,
        new_missing_newline: false,
    })
}

/// Find where `needle` matches `src`, starting at `expected` and moving
/// outwards. Never returns a position before `min`.
fn locate(src: &[&str], needle: &[&str], expected: isize, min: usize) -> Option<usize> {
    let fits = |pos: isize| -> Option<usize> {
        if pos < min as isize {
            return None;
        }
        let pos = pos as usize;
        let end = pos.checked_add(needle.len())?;
        (end <= src.len() && src[pos..end] == *needle).then_some(pos)
    };

    if needle.is_empty() {
        return fits(expected);
    }

    if let Some(pos) = fits(expected) {
        return Some(pos);
    }
    for delta in 1..=src.len() as isize {
        let later = expected.checked_add(delta).and_then(fits);
        if let Some(pos) = later.or_else(|| expected.checked_sub(delta).and_then(fits)) {
            return Some(pos);
        }
    }
    None
}

/// Apply a unified diff to `base`.
pub fn apply_patch(base: &str, diff: &str) -> PatchResult<String> {
    UnifiedDiff::parse(diff)?.apply(base)
}
