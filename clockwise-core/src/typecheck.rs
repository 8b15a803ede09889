//! Type checking for Clockwise programs.
//!
//! This is the fatal half of checking: the first mismatch aborts the
//! pass. Structural checks and lints live in [`crate::checker`].
//!
//! Two modes exist for identifiers and calls:
//!
//! - [`TypeMode::Literal`] gives every identifier and call the type
//!   `int`, whatever it refers to. This is the long-standing behavior
//!   and the default.
//! - [`TypeMode::Resolved`] looks identifiers up among the variables
//!   declared so far in the enclosing function, and calls among the
//!   program's functions and then the runtime helper catalog. Unknown
//!   helpers still fall back to `int`.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{Block, Expr, ExprKind, Function, Program, StmtKind};
use crate::builtins::find_builtin;
use crate::diagnostic::Diagnostic;
use crate::span::Position;
use crate::types::Type;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeMode {
    #[default]
    Literal,
    Resolved,
}

/// A variable declaration together with the type its initializer has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredVar {
    pub function: String,
    pub name: String,
    pub ty: Type,
    pub position: Position,
}

/// Type-check every function of `program`.
///
/// On success returns the type of every `var` declaration, in source
/// order. On failure returns the first type error found.
pub fn typecheck_program(
    program: &Program,
    mode: TypeMode,
) -> Result<Vec<InferredVar>, Diagnostic> {
    let signatures: HashMap<&str, &str> = program
        .functions
        .iter()
        .map(|f| (f.name.as_str(), f.return_type.as_str()))
        .collect();

    let mut vars = Vec::new();
    for function in &program.functions {
        let mut checker = TypeChecker {
            mode,
            function,
            signatures: &signatures,
            env: TypeEnv::default(),
            vars: &mut vars,
        };
        checker.check_function()?;
    }
    debug!(vars = vars.len(), ?mode, "type check passed");
    Ok(vars)
}

/// Variables visible at the current point, innermost last.
///
/// Scopes are handled by remembering the length before entering a
/// block and truncating back to it afterwards.
#[derive(Debug, Default)]
struct TypeEnv {
    entries: Vec<(String, Type)>,
}

impl TypeEnv {
    fn insert(&mut self, name: String, ty: Type) {
        self.entries.push((name, ty));
    }

    fn lookup(&self, name: &str) -> Option<Type> {
        self.entries
            .iter()
            .rev()
            .find_map(|(n, t)| (n == name).then_some(*t))
    }
}

struct TypeChecker<'p, 'v> {
    mode: TypeMode,
    function: &'p Function,
    signatures: &'p HashMap<&'p str, &'p str>,
    env: TypeEnv,
    vars: &'v mut Vec<InferredVar>,
}

impl<'p, 'v> TypeChecker<'p, 'v> {
    fn check_function(&mut self) -> Result<(), Diagnostic> {
        let function = self.function;
        let return_type = Type::from_name(&function.return_type).ok_or_else(|| {
            Diagnostic::type_error(format!(
                "unsupported return type `{}` in function `{}`",
                function.return_type, function.name
            ))
            .at(function.position)
        })?;
        self.check_block(&function.body, return_type)
    }

    fn check_block(&mut self, block: &Block, return_type: Type) -> Result<(), Diagnostic> {
        let scope = self.env.entries.len();
        for stmt in &block.statements {
            match &stmt.kind {
                StmtKind::Return(value) => {
                    let found = self.infer(value)?;
                    if found != return_type {
                        return Err(Diagnostic::type_error(format!(
                            "return type mismatch in function `{}`: expected {}, found {}",
                            self.function.name, return_type, found
                        ))
                        .at(stmt.position));
                    }
                }
                StmtKind::VarDecl {
                    name,
                    type_name,
                    value,
                } => {
                    let found = self.infer(value)?;
                    if let Some(type_name) = type_name {
                        let declared = Type::from_name(type_name).ok_or_else(|| {
                            Diagnostic::type_error(format!(
                                "unsupported type `{type_name}` for variable `{name}`"
                            ))
                            .at(stmt.position)
                        })?;
                        if found != declared {
                            return Err(Diagnostic::type_error(format!(
                                "type mismatch for variable `{name}`: declared {declared}, found {found}"
                            ))
                            .at(stmt.position));
                        }
                    }
                    self.env.insert(name.clone(), found);
                    self.vars.push(InferredVar {
                        function: self.function.name.clone(),
                        name: name.clone(),
                        ty: found,
                        position: stmt.position,
                    });
                }
                StmtKind::Expr(expr) => {
                    self.infer(expr)?;
                }
                StmtKind::If {
                    condition,
                    then_block,
                    else_block,
                } => {
                    self.infer(condition)?;
                    self.check_block(then_block, return_type)?;
                    if let Some(else_block) = else_block {
                        self.check_block(else_block, return_type)?;
                    }
                }
                StmtKind::While { condition, body } => {
                    self.infer(condition)?;
                    self.check_block(body, return_type)?;
                }
            }
        }
        self.env.entries.truncate(scope);
        Ok(())
    }

    fn infer(&mut self, expr: &Expr) -> Result<Type, Diagnostic> {
        match &expr.kind {
            ExprKind::Int(_) => Ok(Type::Int),
            ExprKind::Str(_) => Ok(Type::String),
            ExprKind::Infix { left, op, right } => {
                let lt = self.infer(left)?;
                let rt = self.infer(right)?;
                if lt != rt {
                    return Err(Diagnostic::type_error(format!(
                        "type mismatch in infix `{op}`: left {lt}, right {rt}"
                    ))
                    .at(expr.position));
                }
                Ok(lt)
            }
            ExprKind::Ident(name) => match self.mode {
                TypeMode::Literal => Ok(Type::Int),
                TypeMode::Resolved => self.env.lookup(name).ok_or_else(|| {
                    Diagnostic::type_error(format!(
                        "undefined variable `{name}` in function `{}`",
                        self.function.name
                    ))
                    .at(expr.position)
                }),
            },
            ExprKind::Call { args, .. } => match self.mode {
                TypeMode::Literal => Ok(Type::Int),
                TypeMode::Resolved => {
                    for arg in args {
                        self.infer(arg)?;
                    }
                    Ok(self.call_result(expr))
                }
            },
        }
    }

    fn call_result(&self, call: &Expr) -> Type {
        let Some(name) = call.callee_name() else {
            return Type::Int;
        };
        if let Some(return_type) = self.signatures.get(name) {
            return Type::from_name(return_type).unwrap_or(Type::Int);
        }
        find_builtin(name).map_or(Type::Int, |b| b.result)
    }
}
