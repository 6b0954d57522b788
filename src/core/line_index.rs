//! Byte-offset ↔ line/column conversion.
//!
//! The `LineIndex` of a file's current text is the single authority for
//! every range stored in an index or diagnostic. Columns are counted in
//! UTF-16 code units to match the editor surface; for ASCII documents they
//! coincide with byte offsets within the line.

use crate::base::{Position, Range};

/// Precomputed line-start table for one text snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line. `line_starts[0]` is always 0.
    line_starts: Vec<usize>,
    /// Total length of the indexed text in bytes.
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of `line`, if the line exists.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        self.line_starts.get(line as usize).copied()
    }

    /// Convert a byte offset into a position. Offsets past the end clamp to
    /// the last position.
    pub fn position_at(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = text[line_start..offset]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();
        Position::new(line as u32, column)
    }

    /// Convert a position into a byte offset. Columns past the line end
    /// clamp to the end of the line; lines past the end return `None`.
    pub fn offset_at(&self, text: &str, position: Position) -> Option<usize> {
        let line_start = self.line_start(position.line)?;
        let line_end = self
            .line_start(position.line + 1)
            .unwrap_or(self.len);
        let mut units = 0u32;
        for (i, c) in text[line_start..line_end].char_indices() {
            if units >= position.column {
                return Some(line_start + i);
            }
            units += c.len_utf16() as u32;
        }
        Some(line_end)
    }

    /// Convert a byte range into a `Range`.
    pub fn range_at(&self, text: &str, start: usize, end: usize) -> Range {
        Range::new(self.position_at(text, start), self.position_at(text, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_ascii() {
        let text = "abc\ndef\n";
        let index = LineIndex::new(text);

        assert_eq!(index.position_at(text, 0), Position::new(0, 0));
        assert_eq!(index.position_at(text, 2), Position::new(0, 2));
        assert_eq!(index.position_at(text, 4), Position::new(1, 0));
        assert_eq!(index.position_at(text, 7), Position::new(1, 3));
        assert_eq!(index.position_at(text, 8), Position::new(2, 0));
    }

    #[test]
    fn test_offset_at_round_trip() {
        let text = "one\ntwo three\nfour";
        let index = LineIndex::new(text);

        for offset in [0, 3, 4, 9, 13, 14, 18] {
            let pos = index.position_at(text, offset);
            assert_eq!(index.offset_at(text, pos), Some(offset), "offset {offset}");
        }
    }

    #[test]
    fn test_offset_clamps_past_line_end() {
        let text = "ab\ncd";
        let index = LineIndex::new(text);

        assert_eq!(index.offset_at(text, Position::new(0, 99)), Some(2));
        assert_eq!(index.offset_at(text, Position::new(1, 99)), Some(5));
        assert_eq!(index.offset_at(text, Position::new(5, 0)), None);
    }

    #[test]
    fn test_non_ascii_columns_are_utf16() {
        let text = "é😀x";
        let index = LineIndex::new(text);

        // 'é' is one UTF-16 unit, '😀' is two.
        let x_offset = text.find('x').unwrap();
        assert_eq!(index.position_at(text, x_offset), Position::new(0, 3));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let text = "ab";
        let index = LineIndex::new(text);
        assert_eq!(index.position_at(text, 100), Position::new(0, 2));
    }
}
