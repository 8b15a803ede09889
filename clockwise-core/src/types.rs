//! The Clockwise type universe.
//!
//! There are exactly two types. Comparison operators have no result
//! type of their own: they yield the type of their operands, since the
//! language has no boolean.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    String,
}

impl Type {
    /// Resolve a declared type name. Anything outside `int`/`string` is unsupported.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "string" => Some(Type::String),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
        }
    }

    /// Spelling of this type in generated Go.
    pub fn go_name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
        }
    }

    /// Go literal for the zero value of this type.
    pub fn zero_literal(self) -> &'static str {
        match self {
            Type::Int => "0",
            Type::String => "\"\"",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
