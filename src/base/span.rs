//! Line/column positions and spans for syntax nodes.

use std::fmt;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally; displayed as 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub column: u32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A source range attached to a syntax node.
///
/// Synthetically constructed nodes have no concrete position; diagnostics
/// against them fall back to [`Span::ZERO`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// The zero-range sentinel used for nodes without a concrete position.
    pub const ZERO: Span = Span {
        start: Position::new(0, 0),
        end: Position::new(0, 0),
    };

    /// Create a new span.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span covering a single line range.
    pub const fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(line, start_col),
            end: Position::new(line, end_col),
        }
    }

    /// Whether this is the zero-range sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_span_sentinel() {
        assert!(Span::ZERO.is_zero());
        assert!(!Span::on_line(0, 0, 4).is_zero());
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 0) > Position::new(0, 10));
        assert!(Position::new(2, 3) > Position::new(2, 1));
    }
}
