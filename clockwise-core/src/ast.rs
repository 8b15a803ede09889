//! Syntax tree for Clockwise programs.
//!
//! The tree is built once by the parser and only read afterwards.
//! Statement and expression kinds are closed enums so every consumer
//! matches them exhaustively.
//!
//! Positions are carried for diagnostics but do not take part in
//! equality: two trees are equal when their structure is, which is
//! what makes `a[2]` and `Slice(a, 2, -1)` the same program.

use core::fmt;

use crate::span::Position;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub functions: Vec<Function>,
    /// Import paths in first-seen order, without duplicates.
    pub imports: Vec<String>,
}

impl Program {
    /// Record an import path unless it is already present.
    pub fn add_import(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.imports.contains(&path) {
            return false;
        }
        self.imports.push(path);
        true
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Total number of functions, statements and expressions in the tree.
    pub fn node_count(&self) -> usize {
        self.functions.iter().map(Function::node_count).sum()
    }
}

/// A function parameter.
///
/// The grammar has no production for parameter lists yet, so every
/// parsed function has an empty `params`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: String,
    pub body: Block,
    pub position: Position,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.return_type == other.return_type
            && self.body == other.body
    }
}

impl Eq for Function {}

impl Function {
    pub fn node_count(&self) -> usize {
        1 + self.body.node_count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Block { statements }
    }

    pub fn node_count(&self) -> usize {
        self.statements.iter().map(Stmt::node_count).sum()
    }

    /// Whether the last statement is a `return`.
    pub fn ends_with_return(&self) -> bool {
        matches!(
            self.statements.last().map(|s| &s.kind),
            Some(StmtKind::Return(_))
        )
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub position: Position,
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Stmt {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Return(Expr),
    VarDecl {
        name: String,
        /// `None` when the declaration omits `: type`.
        type_name: Option<String>,
        value: Expr,
    },
    Expr(Expr),
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
}

impl Stmt {
    pub fn new(kind: StmtKind, position: Position) -> Self {
        Stmt { kind, position }
    }

    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            StmtKind::Return(expr) | StmtKind::Expr(expr) => expr.node_count(),
            StmtKind::VarDecl { value, .. } => value.node_count(),
            StmtKind::If {
                condition,
                then_block,
                else_block,
            } => {
                condition.node_count()
                    + then_block.node_count()
                    + else_block.as_ref().map_or(0, Block::node_count)
            }
            StmtKind::While { condition, body } => condition.node_count() + body.node_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Expr {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Integer literal, kept as written (`-1` only appears via desugaring).
    Int(String),
    /// String literal contents without the quotes.
    Str(String),
    Ident(String),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Expr { kind, position }
    }

    pub fn int(text: impl Into<String>, position: Position) -> Self {
        Expr::new(ExprKind::Int(text.into()), position)
    }

    pub fn string(text: impl Into<String>, position: Position) -> Self {
        Expr::new(ExprKind::Str(text.into()), position)
    }

    pub fn ident(name: impl Into<String>, position: Position) -> Self {
        Expr::new(ExprKind::Ident(name.into()), position)
    }

    pub fn call(callee: Expr, args: Vec<Expr>, position: Position) -> Self {
        Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            position,
        )
    }

    pub fn infix(left: Expr, op: InfixOp, right: Expr) -> Self {
        let position = left.position;
        Expr::new(
            ExprKind::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            position,
        )
    }

    /// Name of the called function when the callee is a plain identifier.
    pub fn callee_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Call { callee, .. } => match &callee.kind {
                ExprKind::Ident(name) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn node_count(&self) -> usize {
        1 + match &self.kind {
            ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Ident(_) => 0,
            ExprKind::Call { callee, args } => {
                callee.node_count() + args.iter().map(Expr::node_count).sum::<usize>()
            }
            ExprKind::Infix { left, right, .. } => left.node_count() + right.node_count(),
        }
    }
}

/// Binary operators, weakest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
}

impl InfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
        }
    }

    /// Binding strength: equality < relational < additive < multiplicative.
    pub fn precedence(self) -> u8 {
        match self {
            InfixOp::Eq | InfixOp::NotEq => 1,
            InfixOp::Lt | InfixOp::Gt => 2,
            InfixOp::Add | InfixOp::Sub => 3,
            InfixOp::Mul | InfixOp::Div => 4,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() <= 2
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `child`, printed as an operand of `parent`, needs parentheses
/// to keep the tree shape under left-associative precedence rules.
pub fn operand_needs_parens(child: &Expr, parent: InfixOp, is_right: bool) -> bool {
    match &child.kind {
        ExprKind::Infix { op, .. } => {
            let (child_prec, parent_prec) = (op.precedence(), parent.precedence());
            child_prec < parent_prec || (is_right && child_prec == parent_prec)
        }
        _ => false,
    }
}
