//! Parser for Clockwise.
//!
//! Declarations and statements are parsed by recursive descent;
//! expressions by precedence climbing over [`InfixOp::precedence`].
//! Parsing stops at the first syntax error.

use std::borrow::Cow;

use tracing::debug;

use crate::ast::{Block, Expr, ExprKind, Function, InfixOp, Program, Stmt, StmtKind};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::CoreError;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::span::Position;

/// Name of the runtime helper that index syntax desugars to.
pub const SLICE_HELPER: &str = "Slice";

/// End-index sentinel meaning "through the end of the sequence".
pub const SLICE_TO_END: &str = "-1";

/// Return type assumed when a function omits `-> type`.
pub const DEFAULT_RETURN_TYPE: &str = "int";

/// Lex and parse one compilation unit.
pub fn parse_source(source: &str) -> Result<Program, CoreError> {
    let tokens = tokenize(source);
    parse(&tokens)
}

/// Parse a token sequence (as produced by [`tokenize`]) into a program.
///
/// A sequence that does not end in `Eof` is treated as if it did.
pub fn parse(tokens: &[Token]) -> Result<Program, CoreError> {
    let tokens = terminated(tokens);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let program = parser.parse_program()?;
    debug!(
        functions = program.functions.len(),
        imports = program.imports.len(),
        "parsed compilation unit"
    );
    Ok(program)
}

fn terminated(tokens: &[Token]) -> Cow<'_, [Token]> {
    match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof => Cow::Borrowed(tokens),
        last => {
            let mut owned = tokens.to_vec();
            owned.push(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                position: last.map_or(Position::start(), |t| t.position),
            });
            Cow::Owned(owned)
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_program(&mut self) -> Result<Program, CoreError> {
        let mut program = Program::default();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return Ok(program),
                TokenKind::Import => {
                    let path = self.parse_import()?;
                    program.add_import(path);
                }
                TokenKind::Fn => program.functions.push(self.parse_function()?),
                _ => return Err(self.unexpected("`fn` or `import`")),
            }
        }
    }

    fn parse_import(&mut self) -> Result<String, CoreError> {
        self.expect(TokenKind::Import)?;
        let path = self.expect(TokenKind::String)?.lexeme.clone();
        self.expect(TokenKind::Semi)?;
        Ok(path)
    }

    fn parse_function(&mut self) -> Result<Function, CoreError> {
        let position = self.expect(TokenKind::Fn)?.position;
        let name = self.expect(TokenKind::Ident)?.lexeme.clone();
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;

        let return_type = if self.consume_if(TokenKind::Arrow) {
            self.expect(TokenKind::Ident)?.lexeme.clone()
        } else {
            DEFAULT_RETURN_TYPE.to_string()
        };

        let body = self.parse_block()?;
        Ok(Function {
            name,
            params: Vec::new(),
            return_type,
            body,
            position,
        })
    }

    fn parse_block(&mut self) -> Result<Block, CoreError> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Stmt, CoreError> {
        match self.peek_kind() {
            TokenKind::Return => self.parse_return(),
            TokenKind::Var => self.parse_var(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            _ => {
                let position = self.peek().position;
                let expr = self.parse_expr()?;
                self.consume_if(TokenKind::Semi);
                Ok(Stmt::new(StmtKind::Expr(expr), position))
            }
        }
    }

    fn parse_return(&mut self) -> Result<Stmt, CoreError> {
        let position = self.expect(TokenKind::Return)?.position;
        let value = self.parse_expr()?;
        self.consume_if(TokenKind::Semi);
        Ok(Stmt::new(StmtKind::Return(value), position))
    }

    fn parse_var(&mut self) -> Result<Stmt, CoreError> {
        let position = self.expect(TokenKind::Var)?.position;
        let name = self.expect(TokenKind::Ident)?.lexeme.clone();
        let type_name = if self.consume_if(TokenKind::Colon) {
            Some(self.expect(TokenKind::Ident)?.lexeme.clone())
        } else {
            None
        };
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        self.consume_if(TokenKind::Semi);
        Ok(Stmt::new(
            StmtKind::VarDecl {
                name,
                type_name,
                value,
            },
            position,
        ))
    }

    fn parse_if(&mut self) -> Result<Stmt, CoreError> {
        let position = self.expect(TokenKind::If)?.position;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        let else_block = if self.consume_if(TokenKind::Else) {
            if self.peek_kind() == TokenKind::If {
                // `else if` chains nest as a block holding a single `if`.
                Some(Block::new(vec![self.parse_if()?]))
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_block,
                else_block,
            },
            position,
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, CoreError> {
        let position = self.expect(TokenKind::While)?.position;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::While { condition, body }, position))
    }

    fn parse_condition(&mut self) -> Result<Expr, CoreError> {
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_expr(&mut self) -> Result<Expr, CoreError> {
        self.parse_expr_with_precedence(0)
    }

    fn parse_expr_with_precedence(&mut self, min_precedence: u8) -> Result<Expr, CoreError> {
        let mut left = self.parse_primary()?;
        while let Some(op) = infix_op(self.peek_kind()) {
            if op.precedence() <= min_precedence {
                break;
            }
            self.bump();
            let right = self.parse_expr_with_precedence(op.precedence())?;
            left = Expr::infix(left, op, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, CoreError> {
        let token = self.peek();
        let position = token.position;
        match token.kind {
            TokenKind::Ident => {
                let name = token.lexeme.clone();
                self.bump();
                let ident = Expr::ident(name, position);
                match self.peek_kind() {
                    TokenKind::LParen => self.parse_call(ident),
                    TokenKind::LBracket => self.parse_index(ident),
                    _ => Ok(ident),
                }
            }
            TokenKind::Int => {
                let text = token.lexeme.clone();
                self.bump();
                Ok(Expr::int(text, position))
            }
            TokenKind::String => {
                let text = token.lexeme.clone();
                self.bump();
                Ok(Expr::string(text, position))
            }
            TokenKind::LParen => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, CoreError> {
        let position = callee.position;
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek_kind() != TokenKind::RParen {
            loop {
                args.push(self.parse_expr()?);
                if !self.consume_if(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(Expr::call(callee, args, position))
    }

    /// `x[a]` becomes `Slice(x, a, -1)` and `x[a, b]` becomes `Slice(x, a, b)`.
    fn parse_index(&mut self, target: Expr) -> Result<Expr, CoreError> {
        let position = target.position;
        let bracket = self.expect(TokenKind::LBracket)?.position;
        let start = self.parse_expr()?;
        let end = if self.consume_if(TokenKind::Comma) {
            self.parse_expr()?
        } else {
            Expr::int(SLICE_TO_END, bracket)
        };
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::call(
            Expr::ident(SLICE_HELPER, position),
            vec![target, start, end],
            position,
        ))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, CoreError> {
        let token = self.peek();
        if token.kind == kind {
            self.bump();
            Ok(token)
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn consume_if(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> CoreError {
        let token = self.peek();
        let diag = if token.kind == TokenKind::Illegal {
            Diagnostic::error(
                DiagnosticKind::LexIllegal,
                format!("illegal character `{}`, expected {expected}", token.lexeme),
            )
            .at(token.position)
        } else {
            let found = match token.kind {
                TokenKind::Ident | TokenKind::Int => {
                    format!("{} `{}`", token.kind, token.lexeme)
                }
                other => other.to_string(),
            };
            Diagnostic::syntax(format!("expected {expected}, found {found}"), token.position)
        };
        CoreError::Syntax(diag)
    }

    fn peek(&self) -> &'a Token {
        // The sequence ends with Eof, and `bump` never moves past it.
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    match kind {
        TokenKind::Eq => Some(InfixOp::Eq),
        TokenKind::NotEq => Some(InfixOp::NotEq),
        TokenKind::Lt => Some(InfixOp::Lt),
        TokenKind::Gt => Some(InfixOp::Gt),
        TokenKind::Plus => Some(InfixOp::Add),
        TokenKind::Minus => Some(InfixOp::Sub),
        TokenKind::Star => Some(InfixOp::Mul),
        TokenKind::Slash => Some(InfixOp::Div),
        _ => None,
    }
}

/// Whether the expression is a call to the index helper produced by desugaring.
pub fn is_slice_call(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Call { args, .. } if args.len() == 3)
        && expr.callee_name() == Some(SLICE_HELPER)
}
