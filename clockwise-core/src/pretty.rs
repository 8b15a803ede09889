//! Canonical source formatting for Clockwise programs.
//!
//! Output re-parses to a structurally equal tree. Desugared index
//! expressions are printed back in index form, since the `-1` sentinel
//! has no surface syntax of its own.

use std::fmt::Write;

use crate::ast::{Block, Expr, ExprKind, Function, InfixOp, Program, StmtKind, operand_needs_parens};
use crate::parser::{SLICE_TO_END, is_slice_call};

const INDENT: &str = "    ";

pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    for path in &program.imports {
        let _ = writeln!(out, "import \"{path}\";");
    }
    for (i, function) in program.functions.iter().enumerate() {
        if i > 0 || !program.imports.is_empty() {
            out.push('\n');
        }
        format_function(&mut out, function);
    }
    out
}

fn format_function(out: &mut String, function: &Function) {
    let _ = write!(out, "fn {}() -> {} ", function.name, function.return_type);
    format_block(out, &function.body, 0);
    out.push('\n');
}

fn format_block(out: &mut String, block: &Block, depth: usize) {
    if block.statements.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for stmt in &block.statements {
        indent(out, depth + 1);
        match &stmt.kind {
            StmtKind::Return(value) => {
                let _ = writeln!(out, "return {};", format_expr(value));
            }
            StmtKind::VarDecl {
                name,
                type_name,
                value,
            } => {
                let _ = match type_name {
                    Some(ty) => writeln!(out, "var {name}: {ty} = {};", format_expr(value)),
                    None => writeln!(out, "var {name} = {};", format_expr(value)),
                };
            }
            StmtKind::Expr(expr) => {
                let _ = writeln!(out, "{};", format_expr(expr));
            }
            StmtKind::If {
                condition,
                then_block,
                else_block,
            } => {
                format_if(out, condition, then_block, else_block.as_ref(), depth + 1);
                out.push('\n');
            }
            StmtKind::While { condition, body } => {
                let _ = write!(out, "while ({}) ", format_expr(condition));
                format_block(out, body, depth + 1);
                out.push('\n');
            }
        }
    }
    indent(out, depth);
    out.push('}');
}

fn format_if(
    out: &mut String,
    condition: &Expr,
    then_block: &Block,
    else_block: Option<&Block>,
    depth: usize,
) {
    let _ = write!(out, "if ({}) ", format_expr(condition));
    format_block(out, then_block, depth);
    let Some(else_block) = else_block else {
        return;
    };
    out.push_str(" else ");
    if let [only] = else_block.statements.as_slice() {
        if let StmtKind::If {
            condition,
            then_block,
            else_block,
        } = &only.kind
        {
            format_if(out, condition, then_block, else_block.as_ref(), depth);
            return;
        }
    }
    format_block(out, else_block, depth);
}

pub fn format_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Int(text) if text.starts_with('-') => format!("(0 - {})", &text[1..]),
        ExprKind::Int(text) => text.clone(),
        ExprKind::Str(text) => format!("\"{text}\""),
        ExprKind::Ident(name) => name.clone(),
        ExprKind::Call { callee, args } => {
            if is_slice_call(expr) {
                if let ExprKind::Ident(target) = &args[0].kind {
                    return match &args[2].kind {
                        ExprKind::Int(end) if end == SLICE_TO_END => {
                            format!("{target}[{}]", format_expr(&args[1]))
                        }
                        _ => format!(
                            "{target}[{}, {}]",
                            format_expr(&args[1]),
                            format_expr(&args[2])
                        ),
                    };
                }
            }
            let args: Vec<String> = args.iter().map(format_expr).collect();
            format!("{}({})", format_expr(callee), args.join(", "))
        }
        ExprKind::Infix { left, op, right } => {
            let l = format_operand(left, *op, false);
            let r = format_operand(right, *op, true);
            format!("{l} {op} {r}")
        }
    }
}

fn format_operand(expr: &Expr, parent: InfixOp, is_right: bool) -> String {
    let text = format_expr(expr);
    if operand_needs_parens(expr, parent, is_right) {
        format!("({text})")
    } else {
        text
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
