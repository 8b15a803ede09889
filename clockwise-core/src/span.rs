//! Source positions.

use core::fmt;

/// A 1-based line/column pair assigned by the lexer.
///
/// Columns count Unicode scalar values, not bytes, so that positions
/// line up with what an editor shows for non-ASCII identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Position of the first character of a source text.
    pub const fn start() -> Self {
        Position { line: 1, column: 1 }
    }

    /// Advance past `ch`.
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} col {}", self.line, self.column)
    }
}
