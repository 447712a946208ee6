use std::ops::Range;

use crate::error::CoreError;
use crate::locate::line_start;

#[derive(Debug, Clone)]
struct Edit {
    range: Range<usize>,
    text: String,
    seq: usize,
}

/// Text edits computed against one snapshot and applied in a single pass.
///
/// Inserts at the same offset keep the order they were queued in. Edits
/// whose ranges overlap are rejected rather than guessed at.
#[derive(Debug, Clone, Default)]
pub struct EditBatch {
    edits: Vec<Edit>,
}

impl EditBatch {
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    pub fn delete(&mut self, range: Range<usize>) {
        self.replace(range, "");
    }

    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        let seq = self.edits.len();
        self.edits.push(Edit {
            range,
            text: text.into(),
            seq,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn apply(mut self, src: &str) -> Result<String, CoreError> {
        // pure inserts sort ahead of a replacement starting at the same offset
        self.edits
            .sort_by_key(|e| (e.range.start, !e.range.is_empty(), e.seq));
        self.edits.dedup_by(|later, earlier| {
            !later.range.is_empty() && later.range == earlier.range && later.text == earlier.text
        });

        let mut out = String::with_capacity(src.len());
        let mut cursor = 0;
        for edit in &self.edits {
            if edit.range.start < cursor || edit.range.end > src.len() {
                return Err(CoreError::IntegrityViolation(format!(
                    "overlapping edits at byte {}",
                    edit.range.start
                )));
            }
            out.push_str(&src[cursor..edit.range.start]);
            out.push_str(&edit.text);
            cursor = edit.range.end;
        }
        out.push_str(&src[cursor..]);
        Ok(out)
    }
}

/// Widen `range` to whole lines when nothing but whitespace shares them,
/// so removing an entry does not leave a blank line behind.
pub fn whole_lines(text: &str, range: Range<usize>) -> Range<usize> {
    let start = line_start(text, range.start);
    if !text[start..range.start].trim().is_empty() {
        return range;
    }
    let line_end = text[range.end..]
        .find('\n')
        .map_or(text.len(), |i| range.end + i + 1);
    if !text[range.end..line_end].trim().is_empty() {
        return range;
    }
    start..line_end
}
