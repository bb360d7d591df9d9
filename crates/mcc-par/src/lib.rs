//! mcc-par - Parsing for the mcc compiler.
//!
//! Consumes the token stream produced by `mcc-lex` and builds the AST
//! defined in [`ast`]. Statements are parsed by recursive descent
//! ([`stmt`]); expressions use precedence climbing ([`expr`]).
//!
//! The parser is fail-fast: the first mismatch returns a structured
//! [`ParseError`] and no recovery is attempted. Lvalue checking is NOT done
//! here; assignment targets are parsed as ordinary expressions and verified
//! by the semantic passes.

pub mod ast;
pub mod expr;
pub mod printer;
pub mod stmt;

pub use ast::{
    BinaryOp, BlockItem, Declaration, Expr, ForInit, Function, PostfixOp, Program, Stmt, UnaryOp,
};
pub use printer::{print_program, print_source};

use mcc_lex::{Token, TokenKind};
use thiserror::Error;

/// A structured parse error: what was expected, what was found, and where.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}: expected {expected}, found {received} at token {index}")]
pub struct ParseError {
    /// Index of the offending token in the stream.
    pub index: usize,
    /// Description of what the parser expected.
    pub expected: String,
    /// The kind actually found.
    pub received: TokenKind,
    /// Context message (which construct was being parsed).
    pub message: String,
}

/// The mcc parser.
///
/// Owns a position into a borrowed token slice. The slice must be terminated
/// by an `Eof` token (the lexer guarantees this); `peek` never runs past it.
///
/// # Example
///
/// ```
/// use mcc_lex::Lexer;
/// use mcc_par::Parser;
/// use mcc_util::Handler;
///
/// let mut handler = Handler::new();
/// let tokens = Lexer::new("int main(void) { return 2; }", &mut handler).tokenize();
/// let program = Parser::new(&tokens).parse_program().unwrap();
/// assert_eq!(program.function.name, "main");
/// ```
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over an `Eof`-terminated token slice.
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            tokens.last().map(|t| t.kind) == Some(TokenKind::Eof),
            "token stream must end in Eof"
        );
        Self { tokens, pos: 0 }
    }

    /// Parses a whole program: one function followed by end of input.
    pub fn parse_program(&mut self) -> Result<ast::Program, ParseError> {
        let function = self.parse_function()?;
        self.expect(TokenKind::Eof, "program")?;
        Ok(ast::Program { function })
    }

    /// Parses `int name ( void ) { block-item* }`.
    fn parse_function(&mut self) -> Result<ast::Function, ParseError> {
        self.expect(TokenKind::KwInt, "function definition")?;
        let name = self.expect_identifier("function definition")?;
        self.expect(TokenKind::OpenParen, "function definition")?;
        self.expect(TokenKind::KwVoid, "function parameter list")?;
        self.expect(TokenKind::CloseParen, "function parameter list")?;
        self.expect(TokenKind::OpenBrace, "function body")?;

        let mut body = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            body.push(self.parse_block_item()?);
        }
        self.expect(TokenKind::CloseBrace, "function body")?;

        Ok(ast::Function { name, body })
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    /// The current token. Stays on the trailing `Eof` once reached.
    pub(crate) fn peek(&self) -> &'a Token {
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// The token `n` positions ahead, clamped to the trailing `Eof`.
    pub(crate) fn peek_ahead(&self, n: usize) -> &'a Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Consumes and returns the current token.
    pub(crate) fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Returns true if the current token has the given kind.
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of the given kind or fails.
    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        context: &str,
    ) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(kind.to_string(), context))
        }
    }

    /// Consumes an identifier token and returns its text.
    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<String, ParseError> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(self.error("identifier", context))
        }
    }

    /// Builds a parse error at the current position.
    pub(crate) fn error(&self, expected: impl Into<String>, message: &str) -> ParseError {
        ParseError {
            index: self.pos,
            expected: expected.into(),
            received: self.peek().kind,
            message: message.to_string(),
        }
    }
}
