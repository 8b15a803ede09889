use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("unsupported emit format: {0}")]
    UnsupportedFormat(String),
    #[error("source directory was not found at {0}")]
    MissingSourceDir(PathBuf),
    #[error("failed to walk source directory: {0}")]
    SourceWalk(#[from] walkdir::Error),
    #[error("syntax error: {0}")]
    Syntax(Diagnostic),
    #[error("type error: {0}")]
    Type(Diagnostic),
    #[error("semantic error: {0}")]
    Structural(Diagnostic),
    #[error("duplicate function `{name}` across compilation units")]
    DuplicateFunction { name: String },
}

impl CoreError {
    /// The diagnostic behind this error, if it came from a pipeline stage.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CoreError::Syntax(diag) | CoreError::Type(diag) | CoreError::Structural(diag) => {
                Some(diag)
            }
            _ => None,
        }
    }
}
