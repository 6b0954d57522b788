//! Source locations shared by every index and diagnostic.
//!
//! Positions are 0-indexed line/column pairs (LSP-compatible). Every range
//! persisted in an index is produced by the [`crate::core::LineIndex`] of
//! the file's current text, so ranges from different snapshots never mix.

use std::sync::Arc;

/// A position in source text (0-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A range in source text, inclusive of both end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from line/column coordinates.
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this range.
    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }
}

/// A range inside a named document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub uri: Arc<str>,
    pub range: Range,
}

impl Location {
    pub fn new(uri: impl Into<Arc<str>>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = Range::from_coords(1, 4, 3, 2);

        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(2, 0)));
        assert!(range.contains(Position::new(3, 2)));

        assert!(!range.contains(Position::new(1, 3)));
        assert!(!range.contains(Position::new(3, 3)));
        assert!(!range.contains(Position::new(0, 10)));
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 0) < Position::new(2, 0));
        assert!(Position::new(1, 3) < Position::new(1, 4));
    }
}
