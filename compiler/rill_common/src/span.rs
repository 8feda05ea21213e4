//! Source locations
//!
//! Positions are 1-based line/column pairs. They order the way they appear
//! in the file, so merging two spans is nothing more than `min`/`max` over
//! their endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line and column in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The first character of a file.
    pub fn origin() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A region of source text, from `start` through `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width span at a single position.
    pub fn point(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_order_by_line_then_column() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(3, 2) < Position::new(3, 5));
        assert!(Position::origin() <= Position::new(1, 1));
    }

    #[test]
    fn merged_spans_cover_both_inputs() {
        let first = Span::new(Position::new(1, 1), Position::new(1, 4));
        let second = Span::new(Position::new(2, 1), Position::new(2, 6));
        let merged = first.to(second);
        assert_eq!(merged.start, first.start);
        assert_eq!(merged.end, second.end);
        assert_eq!(merged, second.to(first));
    }

    #[test]
    fn positions_render_as_line_colon_column() {
        assert_eq!(Position::new(3, 5).to_string(), "3:5");
    }
}
