//! Structured diagnostics shared by every stage of the pipeline.
//!
//! Formatting for humans is left to the caller; a diagnostic only
//! carries its category, severity, message and (optionally) the
//! position of the token it was raised at.

use core::fmt;

use crate::span::Position;

/// Category of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Unrecognized character that reached the parser.
    LexIllegal,
    /// Unexpected or missing token.
    Syntax,
    /// Return/var mismatch, infix operand mismatch, unsupported type.
    Type,
    /// Duplicate function, missing `main`, unsupported variable type.
    Structural,
    /// Advisory only.
    Lint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub position: Option<Position>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            severity: Severity::Error,
            message: message.into(),
            position: None,
        }
    }

    pub fn lint(message: impl Into<String>) -> Self {
        Diagnostic {
            kind: DiagnosticKind::Lint,
            severity: Severity::Warning,
            message: message.into(),
            position: None,
        }
    }

    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Diagnostic::error(DiagnosticKind::Syntax, message).at(position)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Diagnostic::error(DiagnosticKind::Type, message)
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Diagnostic::error(DiagnosticKind::Structural, message)
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} at {}", self.message, pos),
            None => f.write_str(&self.message),
        }
    }
}
