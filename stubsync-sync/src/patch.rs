//! Byte-range edits applied in one pass against the original text.

use std::ops::Range;

/// One replacement; an empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub range: Range<usize>,
    pub replacement: String,
}

/// Edits are sorted by start offset (insertion order breaks ties) and must not
/// overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

/// Two patches touch the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub offset: usize,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.patches.push(Patch {
            range,
            replacement: replacement.into(),
        });
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    /// Rewrite every line break inside replacements as `eol`.
    pub fn set_line_ending(&mut self, eol: &str) {
        if eol == "\n" {
            return;
        }
        for patch in &mut self.patches {
            patch.replacement = patch.replacement.replace("\r\n", "\n").replace('\n', eol);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Apply every patch to `original`.
    pub fn apply(&self, original: &str) -> Result<String, Overlap> {
        let mut ordered: Vec<&Patch> = self.patches.iter().collect();
        ordered.sort_by_key(|p| (p.range.start, p.range.end));

        let mut out = String::with_capacity(original.len() + self.added_len());
        let mut cursor = 0;
        for patch in ordered {
            if patch.range.start < cursor || patch.range.end > original.len() {
                return Err(Overlap {
                    offset: patch.range.start,
                });
            }
            out.push_str(&original[cursor..patch.range.start]);
            out.push_str(&patch.replacement);
            cursor = patch.range.end;
        }
        out.push_str(&original[cursor..]);
        Ok(out)
    }

    fn added_len(&self) -> usize {
        self.patches.iter().map(|p| p.replacement.len()).sum()
    }
}
