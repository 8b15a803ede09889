//! Program checking: type pass, structural pass and lints.
//!
//! [`check`] runs the fatal type pass from [`crate::typecheck`] and an
//! independent structural pass, and collects every finding into one
//! [`CheckReport`]. Callers that only want a verdict use
//! [`CheckReport::into_result`], which fails with the first error and
//! ignores lints.

use tracing::{debug, warn};

use crate::ast::{Block, Expr, ExprKind, Program, StmtKind};
use crate::builtins::find_builtin;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::error::CoreError;
use crate::symbols::SymbolTable;
use crate::typecheck::{InferredVar, TypeMode, typecheck_program};
use crate::types::Type;

/// Name of the function every program must define.
pub const ENTRY_POINT: &str = "main";

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Every finding, in the order the passes produced them.
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
    /// Types of `var` declarations; empty when the type pass failed.
    pub vars: Vec<InferredVar>,
}

impl CheckReport {
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn is_ok(&self) -> bool {
        self.first_error().is_none()
    }

    /// Fail with the first error, if any. Lints never fail.
    pub fn into_result(self) -> Result<CheckReport, CoreError> {
        match self.first_error() {
            None => Ok(self),
            Some(diag) if diag.kind == DiagnosticKind::Type => Err(CoreError::Type(diag.clone())),
            Some(diag) => Err(CoreError::Structural(diag.clone())),
        }
    }
}

/// Check a program with identifiers and calls typed as `int`.
pub fn check(program: &Program) -> CheckReport {
    check_with_mode(program, TypeMode::Literal)
}

pub fn check_with_mode(program: &Program, mode: TypeMode) -> CheckReport {
    let mut report = CheckReport::default();

    match typecheck_program(program, mode) {
        Ok(vars) => report.vars = vars,
        Err(diag) => report.diagnostics.push(diag),
    }

    let structural = collect_symbols(program, &report.vars, &mut report.symbols);
    report.diagnostics.extend(structural);

    for lint in lint_program(program) {
        warn!(message = %lint.message, "lint");
        report.diagnostics.push(lint);
    }

    debug!(
        diagnostics = report.diagnostics.len(),
        functions = report.symbols.function_count(),
        "checked program"
    );
    report
}

/// Build the symbol table and report duplicate functions, a missing
/// entry point and unsupported variable types.
pub fn collect_symbols(
    program: &Program,
    inferred: &[InferredVar],
    symbols: &mut SymbolTable,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for function in &program.functions {
        if symbols.register_function(function).is_some() {
            diags.push(
                Diagnostic::structural(format!("duplicate function `{}`", function.name))
                    .at(function.position),
            );
        }
        collect_vars(&function.name, &function.body, inferred, symbols, &mut diags);
    }

    if symbols.lookup_function(ENTRY_POINT).is_none() {
        diags.push(Diagnostic::structural("no main function found"));
    }

    diags
}

fn collect_vars(
    function: &str,
    block: &Block,
    inferred: &[InferredVar],
    symbols: &mut SymbolTable,
    diags: &mut Vec<Diagnostic>,
) {
    for stmt in &block.statements {
        match &stmt.kind {
            StmtKind::VarDecl {
                name, type_name, ..
            } => match type_name {
                Some(type_name) => {
                    if Type::from_name(type_name).is_none() {
                        diags.push(
                            Diagnostic::structural(format!(
                                "unsupported var type `{type_name}` for `{name}` in function `{function}`"
                            ))
                            .at(stmt.position),
                        );
                    }
                    symbols.register_variable(function, name, type_name.as_str());
                }
                None => {
                    let ty = inferred
                        .iter()
                        .find(|v| {
                            v.function == function && v.name == *name && v.position == stmt.position
                        })
                        .map(|v| v.ty);
                    if let Some(ty) = ty {
                        symbols.register_variable(function, name, ty.name());
                    }
                }
            },
            StmtKind::If {
                then_block,
                else_block,
                ..
            } => {
                collect_vars(function, then_block, inferred, symbols, diags);
                if let Some(else_block) = else_block {
                    collect_vars(function, else_block, inferred, symbols, diags);
                }
            }
            StmtKind::While { body, .. } => collect_vars(function, body, inferred, symbols, diags),
            StmtKind::Return(_) | StmtKind::Expr(_) => {}
        }
    }
}

/// Advisory findings. None of these fail a compilation.
pub fn lint_program(program: &Program) -> Vec<Diagnostic> {
    let mut lints = Vec::new();
    for function in &program.functions {
        if function.name == ENTRY_POINT && function.return_type != "int" {
            lints.push(Diagnostic::lint("`main` should return `int`").at(function.position));
        }
        if !function.body.ends_with_return() {
            lints.push(
                Diagnostic::lint(format!(
                    "function `{}` does not end with a return",
                    function.name
                ))
                .at(function.position),
            );
        }
        lint_block(program, &function.body, &mut lints);
    }
    lints
}

fn lint_block(program: &Program, block: &Block, lints: &mut Vec<Diagnostic>) {
    for stmt in &block.statements {
        match &stmt.kind {
            StmtKind::Return(expr)
            | StmtKind::Expr(expr)
            | StmtKind::VarDecl { value: expr, .. } => lint_expr(program, expr, lints),
            StmtKind::If {
                condition,
                then_block,
                else_block,
            } => {
                lint_expr(program, condition, lints);
                lint_block(program, then_block, lints);
                if let Some(else_block) = else_block {
                    lint_block(program, else_block, lints);
                }
            }
            StmtKind::While { condition, body } => {
                lint_expr(program, condition, lints);
                lint_block(program, body, lints);
            }
        }
    }
}

fn lint_expr(program: &Program, expr: &Expr, lints: &mut Vec<Diagnostic>) {
    match &expr.kind {
        ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Ident(_) => {}
        ExprKind::Infix { left, right, .. } => {
            lint_expr(program, left, lints);
            lint_expr(program, right, lints);
        }
        ExprKind::Call { args, .. } => {
            if let Some(name) = expr.callee_name() {
                let helper = find_builtin(name).filter(|_| program.function(name).is_none());
                if let Some(helper) = helper {
                    if helper.params.len() != args.len() {
                        lints.push(
                            Diagnostic::lint(format!(
                                "`{name}` expects {} argument(s), found {}",
                                helper.params.len(),
                                args.len()
                            ))
                            .at(expr.position),
                        );
                    }
                }
            }
            for arg in args {
                lint_expr(program, arg, lints);
            }
        }
    }
}
