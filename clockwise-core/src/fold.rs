//! Literal constant folding, the only optimization the compiler does.
//!
//! Integer `+ - * /` over two literals and string `+` over two literals
//! are replaced by their result. Comparisons are left alone because
//! there is no boolean to fold them into. Division by zero and
//! overflow are left for the target to report.

use tracing::debug;

use crate::ast::{Block, Expr, ExprKind, Function, InfixOp, Program, Stmt, StmtKind};

pub fn fold_program(program: &Program) -> Program {
    let folded = Program {
        functions: program.functions.iter().map(fold_function).collect(),
        imports: program.imports.clone(),
    };
    debug!(
        before = program.node_count(),
        after = folded.node_count(),
        "folded constants"
    );
    folded
}

fn fold_function(function: &Function) -> Function {
    Function {
        body: fold_block(&function.body),
        ..function.clone()
    }
}

fn fold_block(block: &Block) -> Block {
    Block::new(block.statements.iter().map(fold_stmt).collect())
}

fn fold_stmt(stmt: &Stmt) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::Return(value) => StmtKind::Return(fold_expr(value)),
        StmtKind::VarDecl {
            name,
            type_name,
            value,
        } => StmtKind::VarDecl {
            name: name.clone(),
            type_name: type_name.clone(),
            value: fold_expr(value),
        },
        StmtKind::Expr(expr) => StmtKind::Expr(fold_expr(expr)),
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => StmtKind::If {
            condition: fold_expr(condition),
            then_block: fold_block(then_block),
            else_block: else_block.as_ref().map(fold_block),
        },
        StmtKind::While { condition, body } => StmtKind::While {
            condition: fold_expr(condition),
            body: fold_block(body),
        },
    };
    Stmt::new(kind, stmt.position)
}

pub fn fold_expr(expr: &Expr) -> Expr {
    match &expr.kind {
        ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Ident(_) => expr.clone(),
        ExprKind::Call { callee, args } => Expr::new(
            ExprKind::Call {
                callee: callee.clone(),
                args: args.iter().map(fold_expr).collect(),
            },
            expr.position,
        ),
        ExprKind::Infix { left, op, right } => {
            let left = fold_expr(left);
            let right = fold_expr(right);
            match fold_literals(&left.kind, *op, &right.kind) {
                Some(kind) => Expr::new(kind, expr.position),
                None => Expr::new(
                    ExprKind::Infix {
                        left: Box::new(left),
                        op: *op,
                        right: Box::new(right),
                    },
                    expr.position,
                ),
            }
        }
    }
}

fn fold_literals(left: &ExprKind, op: InfixOp, right: &ExprKind) -> Option<ExprKind> {
    match (left, right) {
        (ExprKind::Int(l), ExprKind::Int(r)) => {
            let l: i64 = l.parse().ok()?;
            let r: i64 = r.parse().ok()?;
            let value = match op {
                InfixOp::Add => l.checked_add(r)?,
                InfixOp::Sub => l.checked_sub(r)?,
                InfixOp::Mul => l.checked_mul(r)?,
                InfixOp::Div => l.checked_div(r)?,
                InfixOp::Eq | InfixOp::NotEq | InfixOp::Lt | InfixOp::Gt => return None,
            };
            Some(ExprKind::Int(value.to_string()))
        }
        (ExprKind::Str(l), ExprKind::Str(r)) if op == InfixOp::Add => {
            Some(ExprKind::Str(format!("{l}{r}")))
        }
        _ => None,
    }
}
