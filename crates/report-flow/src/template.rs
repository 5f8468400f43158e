//! Deterministic prompt assembly.
//!
//! Optional inputs become conditional sections: a section whose value is
//! absent or blank is left out entirely rather than rendered empty, so the
//! model is never conditioned on blank context.

use std::collections::HashSet;

/// Builder for a prompt made of paragraphs, labelled inline fields and
/// labelled blocks.
#[derive(Debug, Default)]
pub struct Prompt {
    parts: Vec<String>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional paragraph.
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        self.parts.push(text.as_ref().trim_end().to_string());
        self
    }

    /// `Label: value`, omitted when `value` is absent or blank.
    pub fn field(mut self, label: &str, value: Option<&str>) -> Self {
        if let Some(v) = present(value) {
            self.parts.push(format!("{label}: {v}"));
        }
        self
    }

    /// `Label:` followed by the value on the next lines, omitted when `value`
    /// is absent or blank.
    pub fn block(mut self, label: &str, value: Option<&str>) -> Self {
        if let Some(v) = present(value) {
            self.parts.push(format!("{label}:\n{v}"));
        }
        self
    }

    /// Like [`Prompt::block`] for a list of lines; omitted when empty.
    pub fn lines(self, label: &str, lines: &[String]) -> Self {
        if lines.is_empty() {
            return self;
        }
        let joined = lines.join("\n");
        self.block(label, Some(&joined))
    }

    /// Apply `f` only when `cond` holds, for sections whose presence depends
    /// on more than a single optional value.
    pub fn when(self, cond: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if cond {
            f(self)
        } else {
            self
        }
    }

    pub fn render(self) -> String {
        self.parts.join("\n\n")
    }
}

/// Trimmed, non-blank value of an optional field.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Split free text into task lines: each line trimmed, blank lines dropped,
/// exact duplicates collapsed keeping the first occurrence.
pub fn normalize_lines(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(*l))
        .map(str::to_string)
        .collect()
}
