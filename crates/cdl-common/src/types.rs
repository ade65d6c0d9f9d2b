//! Source location primitives used for diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in CDL source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from the start of the input (0-based).
    pub offset: usize,
    /// Line number (1-based).
    pub line: u32,
    /// Column number in characters (1-based).
    pub column: u32,
}

impl Position {
    /// Creates a position from its parts.
    #[must_use]
    pub const fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The position of the first character of the input.
    #[must_use]
    pub const fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Returns the position after consuming `ch`.
    #[must_use]
    pub const fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self::new(self.offset + 1, self.line + 1, 1)
        } else {
            Self::new(self.offset + ch.len_utf8(), self.line, self.column + 1)
        }
    }

    /// Returns the position after consuming every character of `text`.
    #[must_use]
    pub fn advance_str(self, text: &str) -> Self {
        text.chars().fold(self, Self::advance)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// First position covered by the span.
    pub start: Position,
    /// Position just past the span.
    pub end: Position,
}

impl Span {
    /// Creates a span between two positions.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}
