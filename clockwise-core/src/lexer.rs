//! Lexer for Clockwise source text.

use core::fmt;

use tracing::debug;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::span::Position;

/// Kind of a token produced by the lexer.
///
/// The lexer never fails: characters it does not recognize become
/// `Illegal` tokens, and the parser reports them when it reaches one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,
    Illegal,

    // Identifiers and literals
    Ident,
    Int,
    String,

    // Operators
    Assign,   // =
    Plus,     // +
    Minus,    // -
    Bang,     // !
    Star,     // *
    Slash,    // /
    Lt,       // <
    Gt,       // >
    Eq,       // ==
    NotEq,    // !=

    // Punctuation
    Comma,    // ,
    Semi,     // ;
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Dot,      // .
    Colon,    // :
    Arrow,    // ->

    // Keywords
    Fn,
    Var,
    Return,
    If,
    Else,
    While,
    True,
    False,
    Import,
    Type,
}

/// Reserved words. Anything else that scans as an identifier is an `Ident`.
pub static KEYWORDS: &[(&str, TokenKind)] = &[
    ("fn", TokenKind::Fn),
    ("var", TokenKind::Var),
    ("return", TokenKind::Return),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("import", TokenKind::Import),
    ("type", TokenKind::Type),
];

pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find_map(|(word, kind)| (*word == ident).then_some(*kind))
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Illegal => "illegal character",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer literal",
            TokenKind::String => "string literal",
            TokenKind::Assign => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Bang => "`!`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::Eq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Comma => "`,`",
            TokenKind::Semi => "`;`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Arrow => "`->`",
            TokenKind::Fn => "`fn`",
            TokenKind::Var => "`var`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Import => "`import`",
            TokenKind::Type => "`type`",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single token with its kind, raw text and start position.
///
/// For string literals `lexeme` holds the text between the quotes,
/// exactly as written; no escape processing happens here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

/// Lex a source string into tokens. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        index: 0,
        position: Position::start(),
    };
    let tokens = lexer.run();
    debug!(tokens = tokens.len(), "lexed source");
    tokens
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    position: Position,
}

impl Lexer {
    fn run(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();
            let start = self.position;
            let Some(ch) = self.peek_char() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    position: start,
                });
                return tokens;
            };

            let token = match ch {
                '=' => self.one_or_two(TokenKind::Assign, '=', TokenKind::Eq),
                '!' => self.one_or_two(TokenKind::Bang, '=', TokenKind::NotEq),
                '-' => self.one_or_two(TokenKind::Minus, '>', TokenKind::Arrow),
                '+' => self.single(TokenKind::Plus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '<' => self.single(TokenKind::Lt),
                '>' => self.single(TokenKind::Gt),
                ';' => self.single(TokenKind::Semi),
                ',' => self.single(TokenKind::Comma),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                '.' => self.single(TokenKind::Dot),
                ':' => self.single(TokenKind::Colon),
                '"' => self.lex_string(),
                '0'..='9' => self.lex_number(),
                _ if is_ident_start(ch) => self.lex_ident_or_keyword(),
                _ => self.single(TokenKind::Illegal),
            };

            tokens.push(Token {
                position: start,
                ..token
            });
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.consume_char();
            } else if ch == '/' && self.peek_next() == Some('/') {
                while let Some(ch) = self.peek_char() {
                    if ch == '\n' {
                        break;
                    }
                    self.consume_char();
                }
            } else if ch == '/' && self.peek_next() == Some('*') {
                self.consume_char();
                self.consume_char();
                while let Some(ch) = self.peek_char() {
                    if ch == '*' && self.peek_next() == Some('/') {
                        self.consume_char();
                        self.consume_char();
                        break;
                    }
                    self.consume_char();
                }
            } else {
                break;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let ch = self.consume_char();
        self.token(kind, ch.map(String::from).unwrap_or_default())
    }

    fn one_or_two(&mut self, kind: TokenKind, second: char, joined: TokenKind) -> Token {
        if self.peek_next() == Some(second) {
            let mut lexeme = String::new();
            lexeme.extend(self.consume_char());
            lexeme.extend(self.consume_char());
            self.token(joined, lexeme)
        } else {
            self.single(kind)
        }
    }

    fn lex_string(&mut self) -> Token {
        // opening quote
        self.consume_char();
        let mut text = String::new();
        while let Some(ch) = self.peek_char() {
            self.consume_char();
            if ch == '"' {
                return self.token(TokenKind::String, text);
            }
            text.push(ch);
        }
        // Unterminated: everything up to end of input.
        self.token(TokenKind::String, text)
    }

    fn lex_number(&mut self) -> Token {
        let text = self.take_while(|ch| ch.is_ascii_digit());
        self.token(TokenKind::Int, text)
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let text = self.take_while(is_ident_continue);
        let kind = lookup_keyword(&text).unwrap_or(TokenKind::Ident);
        self.token(kind, text)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            text.push(ch);
            self.consume_char();
        }
        text
    }

    fn token(&self, kind: TokenKind, lexeme: String) -> Token {
        // The caller overwrites the position with the token start.
        Token {
            kind,
            lexeme,
            position: self.position,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.index += 1;
        self.position.advance(ch);
        Some(ch)
    }
}

/// Letters in the Unicode sense (general category L), which is what Go
/// accepts in identifiers. Letter numbers and combining marks are not.
fn is_ident_start(ch: char) -> bool {
    ch == '_'
        || matches!(
            get_general_category(ch),
            GeneralCategory::UppercaseLetter
                | GeneralCategory::LowercaseLetter
                | GeneralCategory::TitlecaseLetter
                | GeneralCategory::ModifierLetter
                | GeneralCategory::OtherLetter
        )
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
