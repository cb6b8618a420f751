//! locc-par - Parsing for the loc language.
//!
//! A recursive-descent parser with explicit operator precedence. The
//! parser owns the lexer and pulls tokens on demand; a small look-ahead
//! buffer carries the re-lexed pieces of template literals so expression
//! parsing can re-enter template bodies without a second pass over the
//! file.
//!
//! Errors never abort the parse. `expect` records a contextual
//! [`SyntaxError`] and keeps going, so a single run can surface every
//! problem in a file; the batch is returned as an
//! [`ErrorSet`](locc_util::ErrorSet) at the entry points.
//!
//! Three entry points are provided: [`parse`] for whole files, and
//! [`parse_stmt`] / [`parse_expr`] / [`parse_type_expr`] for single
//! constructs, used by tooling and tests.

pub mod ast;
pub mod error;

mod expr;
mod stmt;
mod types;

use std::collections::VecDeque;
use std::fmt;

use locc_lex::{Kind, Lexer, Token};
use locc_util::{ErrorSet, Range, Stack};

pub use error::SyntaxError;

/// Result of a parser entry point: the node, or every recorded error.
pub type ParseResult<T> = Result<T, ErrorSet<SyntaxError>>;

/// The syntactic construct currently being parsed.
///
/// Used solely to enrich error messages; see [`Parser::hint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
    TopLevel,
    Statement,
    Entry,
    Expression,
    TypeExpression,
    Sequence,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Context::TopLevel => "top level",
            Context::Statement => "statement",
            Context::Entry => "entry",
            Context::Expression => "expression",
            Context::TypeExpression => "type expression",
            Context::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// The parser.
pub struct Parser<'src> {
    file: String,
    lexer: Lexer<'src>,

    current: Token,
    // Look-ahead used when re-entering template-embedded expressions.
    buffer: VecDeque<Token>,

    errors: Vec<SyntaxError>,
    ctx: Stack<Context>,
    // Comments skipped since the last statement, pending attachment.
    comments: Vec<ast::Comment>,
}

impl<'src> Parser<'src> {
    /// Create a parser for the named source text.
    pub fn new(file: impl Into<String>, source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            file: file.into(),
            lexer,
            current,
            buffer: VecDeque::new(),
            errors: Vec::new(),
            ctx: Stack::default(),
            comments: Vec::new(),
        }
    }

    /// Parse a whole file.
    pub fn parse_file(mut self) -> ParseResult<ast::File> {
        self.ctx.push(Context::TopLevel);
        self.skip();

        let decl = self.parse_decl_stmt();
        self.skip();

        let mut imports = Vec::new();
        while self.current.kind == Kind::Import {
            imports.push(self.parse_import_stmt());
            self.skip();
        }

        let mut stmts = Vec::new();
        while self.current.kind != Kind::Eof {
            stmts.push(self.parse_stmt());
            self.skip();
        }

        let end = stmts
            .last()
            .map(|s| s.range().end)
            .or_else(|| imports.last().map(|i| i.range.end))
            .unwrap_or(decl.range.end);
        let range = Range::new(decl.range.start, end);

        self.finish(ast::File {
            decl,
            imports,
            stmts,
            range,
        })
    }

    fn finish<T>(&mut self, node: T) -> ParseResult<T> {
        if self.errors.is_empty() {
            Ok(node)
        } else {
            Err(ErrorSet::new(
                self.file.clone(),
                std::mem::take(&mut self.errors),
            ))
        }
    }

    /// Consume the current token and return it, pulling the next one from
    /// the look-ahead buffer or the lexer.
    pub(crate) fn advance(&mut self) -> Token {
        let next = match self.buffer.pop_front() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        std::mem::replace(&mut self.current, next)
    }

    /// Skip whitespace and comments, keeping comments for attachment to
    /// the next statement.
    pub(crate) fn skip(&mut self) {
        while matches!(self.current.kind, Kind::Whitespace | Kind::Comment) {
            let token = self.advance();
            if token.kind == Kind::Comment {
                self.comments.push(ast::Comment {
                    literal: token.literal,
                    raw: token.raw,
                    range: token.range,
                });
            }
        }
    }

    /// Take the comments collected since the last statement.
    pub(crate) fn take_comments(&mut self) -> Vec<ast::Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Drop pending comments; used inside entry and field positions where
    /// comments do not attach to a statement.
    pub(crate) fn discard_comments(&mut self) {
        self.comments.clear();
    }

    pub(crate) fn error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    /// Consume the current token, recording an error when it is not one of
    /// the expected kinds. The parser advances either way, which is what
    /// lets it keep reporting past the first problem.
    pub(crate) fn expect(&mut self, expected: &[Kind]) -> Token {
        if !expected.contains(&self.current.kind) {
            match self.current.kind {
                Kind::UntermString | Kind::UntermTemplate | Kind::UntermTemplateExpr => {
                    self.error(SyntaxError::UntermConstruct {
                        kind: self.current.kind,
                        range: self.current.range,
                    });
                }
                _ => {
                    let details = self.hint();
                    self.error(SyntaxError::UnexpectedToken {
                        found: self.current.kind,
                        expected: expected.to_vec(),
                        details,
                        range: self.current.range,
                    });
                }
            }
        }

        self.advance()
    }

    fn hint(&self) -> Option<String> {
        match self.ctx.last() {
            Some(Context::Sequence) => Some("you might have forgotten a closing token".into()),
            Some(Context::Statement) => match self.current.kind {
                Kind::Declare | Kind::Import => Some(format!(
                    "{} is a top level statement, try moving it up",
                    self.current.kind
                )),
                Kind::Ident => {
                    Some("only section statements and fn definitions are valid here".into())
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Parse a bracketed, whitespace-separated sequence. Calls `f` once
    /// per element until the closing kind (or end of input) and returns
    /// the closing token.
    pub(crate) fn seq(
        &mut self,
        open: Kind,
        close: Kind,
        mut f: impl FnMut(&mut Self, usize),
    ) -> Token {
        self.expect(&[open]);
        self.skip();
        self.ctx.push(Context::Sequence);

        let mut index = 0;
        while self.current.kind != Kind::Eof && self.current.kind != close {
            f(self, index);
            self.skip();
            index += 1;
        }

        let token = self.expect(&[close]);
        self.ctx.pop();
        token
    }
}

/// Parse a whole source file.
pub fn parse(file: &str, source: &str) -> ParseResult<ast::File> {
    Parser::new(file, source).parse_file()
}

/// Parse a single statement; the input must contain nothing else.
pub fn parse_stmt(file: &str, source: &str) -> ParseResult<ast::Stmt> {
    let mut parser = Parser::new(file, source);
    parser.skip();
    let node = parser.parse_stmt();
    parser.skip();
    parser.expect(&[Kind::Eof]);
    parser.finish(node)
}

/// Parse a single expression; the input must contain nothing else.
pub fn parse_expr(file: &str, source: &str) -> ParseResult<ast::Expr> {
    let mut parser = Parser::new(file, source);
    parser.skip();
    let node = parser.parse_expr();
    parser.skip();
    parser.expect(&[Kind::Eof]);
    parser.finish(node)
}

/// Parse a single type expression; the input must contain nothing else.
pub fn parse_type_expr(file: &str, source: &str) -> ParseResult<ast::TypeExpr> {
    let mut parser = Parser::new(file, source);
    parser.skip();
    let node = parser.parse_type_expr();
    parser.skip();
    parser.expect(&[Kind::Eof]);
    parser.finish(node)
}
