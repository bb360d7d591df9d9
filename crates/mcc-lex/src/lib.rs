//! mcc-lex - Lexical analysis for the mcc compiler.
//!
//! Transforms preprocessed C source text into a stream of [`Token`]s.
//! The lexer is total: it always produces a sequence terminating in
//! [`TokenKind::Eof`], appending [`TokenKind::Invalid`] tokens and
//! diagnostics for input it cannot classify.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{keyword_from_ident, LiteralValue, Token, TokenKind};
