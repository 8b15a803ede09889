//! Core of the Clockwise toolchain.
//!
//! This crate turns Clockwise source into Go source. The pipeline is:
//!
//!   source .cw
//!     -> lexer      (tokens)
//!     -> parser     (AST, index syntax desugared to `Slice` calls)
//!     -> compiler::merge_units (one program from many units)
//!     -> checker    (types, symbols, lints)
//!     -> fold       (literal constant folding)
//!     -> codegen_go (Go text)
//!
//! Building the Go output is left to the Go toolchain. Higher-level
//! tools (the `cw` CLI) should depend on this crate rather than
//! reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;
pub mod pretty;

// ---------------------------------------------------------------------
// Semantic layers: types, symbols, type checking, structural checks
// ---------------------------------------------------------------------

pub mod types;
pub mod symbols;
pub mod typecheck;
pub mod checker;

// ---------------------------------------------------------------------
// Runtime helpers and source discovery
// ---------------------------------------------------------------------

pub mod builtins;
pub mod sources;

// ---------------------------------------------------------------------
// Back-end: folding, code generation and compiler orchestration
// ---------------------------------------------------------------------

pub mod fold;
pub mod codegen_go;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use checker::{CheckReport, check, check_with_mode};
pub use compiler::{
    CompilationArtifact, CompileOptions, compile_source, compile_units, merge_units, parse_unit,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::CoreError;
pub use lexer::tokenize;
pub use parser::parse;
pub use typecheck::TypeMode;
