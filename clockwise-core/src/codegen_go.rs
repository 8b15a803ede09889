//! Go code generation.
//!
//! One depth-first pass over a checked program. Every expression is
//! lowered; calls go to the runtime helpers by their exact names, which
//! are expected to live in the same Go package as the output.
//!
//! A few rewrites keep the output acceptable to the Go compiler:
//! the user's `main` becomes [`GO_MAIN_ALIAS`] behind a small entry
//! point, locals are marked used, non-comparison conditions are compared
//! against the zero value, and bodies without a trailing `return` get one.

use std::fmt::Write;

use tracing::debug;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::ast::{
    Block, Expr, ExprKind, Function, InfixOp, Program, StmtKind, operand_needs_parens,
};
use crate::builtins::find_builtin;
use crate::checker::ENTRY_POINT;
use crate::types::Type;

/// Go name of the user's `main` function.
pub const GO_MAIN_ALIAS: &str = "cwMain";

const HEADER: &str = "// Code generated by clockwise. DO NOT EDIT.";

/// Names that cannot be used as Go identifiers, or that the output
/// itself depends on.
static RESERVED: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
    "int",
    "string",
    "init",
    "os",
    GO_MAIN_ALIAS,
];

pub fn generate(program: &Program) -> String {
    let mut generator = GoGenerator {
        program,
        out: String::new(),
        locals: Vec::new(),
    };
    generator.emit_program();
    debug!(
        functions = program.functions.len(),
        bytes = generator.out.len(),
        "generated Go source"
    );
    generator.out
}

struct GoGenerator<'p> {
    program: &'p Program,
    out: String,
    /// Locals in scope, innermost last.
    locals: Vec<(String, Type)>,
}

impl<'p> GoGenerator<'p> {
    fn emit_program(&mut self) {
        let program = self.program;
        let entry = program
            .function(ENTRY_POINT)
            .map(|f| Type::from_name(&f.return_type).unwrap_or(Type::Int));

        let _ = writeln!(self.out, "{HEADER}\n\npackage main");
        if entry == Some(Type::Int) {
            self.out.push_str("\nimport \"os\"\n");
        }
        if !program.imports.is_empty() {
            self.out.push('\n');
            for path in &program.imports {
                let _ = writeln!(self.out, "// cw:import {}", quote_go_string(path));
            }
        }

        for function in &program.functions {
            self.out.push('\n');
            self.emit_function(function);
        }

        if let Some(ty) = entry {
            let call = match ty {
                Type::Int => format!("os.Exit({GO_MAIN_ALIAS}())"),
                Type::String => format!("Print({GO_MAIN_ALIAS}())"),
            };
            let _ = writeln!(self.out, "\nfunc main() {{\n\t{call}\n}}");
        }
    }

    fn emit_function(&mut self, function: &Function) {
        let declared = Type::from_name(&function.return_type);
        let result = declared.map_or(function.return_type.as_str(), |ty| ty.go_name());
        let _ = writeln!(
            self.out,
            "func {}() {result} {{",
            go_function_name(&function.name)
        );

        self.locals.clear();
        self.emit_statements(&function.body, 1);
        if !function.body.ends_with_return() {
            let zero = declared.unwrap_or(Type::Int).zero_literal();
            self.line(1, &format!("return {zero}"));
        }
        self.out.push_str("}\n");
    }

    fn emit_statements(&mut self, block: &Block, depth: usize) {
        let scope = self.locals.len();
        for stmt in &block.statements {
            match &stmt.kind {
                StmtKind::Return(value) => {
                    let value = self.expr(value);
                    self.line(depth, &format!("return {value}"));
                }
                StmtKind::VarDecl {
                    name,
                    type_name,
                    value,
                } => {
                    let ty = type_name
                        .as_deref()
                        .and_then(Type::from_name)
                        .unwrap_or_else(|| self.static_type(value));
                    let go_type = match type_name {
                        Some(declared) if Type::from_name(declared).is_none() => declared.as_str(),
                        _ => ty.go_name(),
                    };
                    let ident = go_ident(name);
                    let value = self.expr(value);
                    self.line(depth, &format!("var {ident} {go_type} = {value}"));
                    if ident != "_" {
                        self.line(depth, &format!("_ = {ident}"));
                    }
                    self.locals.push((name.clone(), ty));
                }
                StmtKind::Expr(expr) => {
                    let text = self.expr(expr);
                    if matches!(expr.kind, ExprKind::Call { .. }) {
                        self.line(depth, &text);
                    } else {
                        self.line(depth, &format!("_ = {text}"));
                    }
                }
                StmtKind::If {
                    condition,
                    then_block,
                    else_block,
                } => {
                    self.indent(depth);
                    self.emit_if(condition, then_block, else_block.as_ref(), depth);
                    self.out.push('\n');
                }
                StmtKind::While { condition, body } => {
                    let condition = self.condition(condition);
                    self.line(depth, &format!("for {condition} {{"));
                    self.emit_statements(body, depth + 1);
                    self.line(depth, "}");
                }
            }
        }
        self.locals.truncate(scope);
    }

    /// Emit an `if` chain starting at the current column, without the
    /// final newline.
    fn emit_if(
        &mut self,
        condition: &Expr,
        then_block: &Block,
        else_block: Option<&Block>,
        depth: usize,
    ) {
        let condition = self.condition(condition);
        let _ = writeln!(self.out, "if {condition} {{");
        self.emit_statements(then_block, depth + 1);
        self.indent(depth);
        self.out.push('}');

        let Some(else_block) = else_block else {
            return;
        };
        self.out.push_str(" else ");
        if let [only] = else_block.statements.as_slice() {
            if let StmtKind::If {
                condition,
                then_block,
                else_block,
            } = &only.kind
            {
                self.emit_if(condition, then_block, else_block.as_ref(), depth);
                return;
            }
        }
        self.out.push_str("{\n");
        self.emit_statements(else_block, depth + 1);
        self.indent(depth);
        self.out.push('}');
    }

    /// Go conditions must be boolean; only comparisons are.
    fn condition(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Infix { op, .. } if op.is_comparison() => self.expr(expr),
            _ => format!(
                "({}) != {}",
                self.expr(expr),
                self.static_type(expr).zero_literal()
            ),
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Int(text) => go_int_literal(text),
            ExprKind::Str(text) => quote_go_string(text),
            ExprKind::Ident(name) => go_ident(name),
            ExprKind::Call { callee, args } => {
                let callee = match &callee.kind {
                    ExprKind::Ident(name) => go_function_name(name),
                    _ => self.expr(callee),
                };
                let args: Vec<String> = args.iter().map(|arg| self.expr(arg)).collect();
                format!("{callee}({})", args.join(", "))
            }
            ExprKind::Infix { left, op, right } => {
                let l = self.operand(left, *op, false);
                let r = self.operand(right, *op, true);
                format!("{l} {op} {r}")
            }
        }
    }

    fn operand(&self, expr: &Expr, parent: InfixOp, is_right: bool) -> String {
        let text = self.expr(expr);
        // Go puts all comparisons on one precedence level.
        let nested_comparison = parent.is_comparison()
            && matches!(&expr.kind, ExprKind::Infix { op, .. } if op.is_comparison());
        if nested_comparison || operand_needs_parens(expr, parent, is_right) {
            format!("({text})")
        } else {
            text
        }
    }

    fn static_type(&self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Str(_) => Type::String,
            ExprKind::Ident(name) => self
                .locals
                .iter()
                .rev()
                .find_map(|(n, t)| (n == name).then_some(*t))
                .unwrap_or(Type::Int),
            ExprKind::Call { .. } => {
                let Some(name) = expr.callee_name() else {
                    return Type::Int;
                };
                match self.program.function(name) {
                    Some(function) => Type::from_name(&function.return_type).unwrap_or(Type::Int),
                    None => find_builtin(name).map_or(Type::Int, |b| b.result),
                }
            }
            ExprKind::Infix { left, .. } => self.static_type(left),
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        self.indent(depth);
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push('\t');
        }
    }
}

fn go_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

fn go_function_name(name: &str) -> String {
    if name == ENTRY_POINT {
        GO_MAIN_ALIAS.to_string()
    } else {
        go_ident(name)
    }
}

/// Leading zeros would make Go read the literal as octal.
fn go_int_literal(text: &str) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", text),
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        "0".to_string()
    } else {
        format!("{sign}{digits}")
    }
}

fn quote_go_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            // Go rejects a BOM past the start of a file.
            c if c.is_control() || get_general_category(c) == GeneralCategory::Format => {
                let _ = write!(quoted, "\\u{:04x}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
