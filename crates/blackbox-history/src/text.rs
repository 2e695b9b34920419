//! Line model shared by the diff generator and the patch applier.

/// A text split on `'\n'`, with the final newline tracked separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lines<'a> {
    pub lines: Vec<&'a str>,
    pub trailing_newline: bool,
}

impl<'a> Lines<'a> {
    pub fn split(text: &'a str) -> Self {
        if text.is_empty() {
            return Self {
                lines: Vec::new(),
                trailing_newline: false,
            };
        }

        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };

        Self {
            lines: body.split('\n').collect(),
            trailing_newline,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the last line exists and lacks a terminating newline.
    pub fn missing_final_newline(&self) -> bool {
        !self.lines.is_empty() && !self.trailing_newline
    }
}

/// Join lines back into text.
pub(crate) fn join(lines: &[&str], trailing_newline: bool) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    if trailing_newline {
        text.push('\n');
    }
    text
}
