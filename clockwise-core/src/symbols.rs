//! Symbol table built per checking pass.

use std::collections::HashMap;

use crate::ast::Function;
use crate::span::Position;

/// What the table remembers about a declared function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub name: String,
    pub return_type: String,
    pub position: Position,
}

impl From<&Function> for FunctionSig {
    fn from(function: &Function) -> Self {
        FunctionSig {
            name: function.name.clone(),
            return_type: function.return_type.clone(),
            position: function.position,
        }
    }
}

/// Function name -> signature, and (function, variable) -> declared type name.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    functions: HashMap<String, FunctionSig>,
    variables: HashMap<(String, String), String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Register a function, returning the previous entry under the same name.
    pub fn register_function(&mut self, function: &Function) -> Option<FunctionSig> {
        self.functions
            .insert(function.name.clone(), FunctionSig::from(function))
    }

    pub fn register_variable(
        &mut self,
        function: &str,
        variable: &str,
        type_name: impl Into<String>,
    ) {
        self.variables.insert(
            (function.to_string(), variable.to_string()),
            type_name.into(),
        );
    }

    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSig> {
        self.functions.get(name)
    }

    pub fn lookup_variable(&self, function: &str, variable: &str) -> Option<&str> {
        self.variables
            .get(&(function.to_string(), variable.to_string()))
            .map(String::as_str)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Registered function names, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
