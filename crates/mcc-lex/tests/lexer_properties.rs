//! Property-based tests for the lexer.
//!
//! The central property: lexing is a total function. For any input string,
//! `tokenize` terminates and returns a sequence ending in `Eof`, never
//! panicking, whatever bytes it is fed.

use mcc_lex::{Lexer, TokenKind};
use mcc_util::Handler;
use proptest::prelude::*;

proptest! {
    #[test]
    fn lexing_is_total(source in "\\PC*") {
        let mut handler = Handler::new();
        let tokens = Lexer::new(&source, &mut handler).tokenize();
        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn exactly_one_eof(source in "\\PC*") {
        let mut handler = Handler::new();
        let tokens = Lexer::new(&source, &mut handler).tokenize();
        let eof_count = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eof_count, 1);
    }

    #[test]
    fn valid_identifiers_lex_to_one_token(ident in "[a-zA-Z_][a-zA-Z0-9_]{0,20}") {
        let mut handler = Handler::new();
        let tokens = Lexer::new(&ident, &mut handler).tokenize();
        prop_assert_eq!(tokens.len(), 2);
        prop_assert!(
            tokens[0].kind == TokenKind::Identifier || tokens[0].kind.is_keyword()
        );
        prop_assert_eq!(&tokens[0].lexeme, &ident);
    }

    #[test]
    fn small_decimal_literals_round_trip(value in 0i32..=i32::MAX) {
        let source = value.to_string();
        let mut handler = Handler::new();
        let tokens = Lexer::new(&source, &mut handler).tokenize();
        prop_assert!(!handler.has_errors());
        prop_assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        prop_assert_eq!(tokens[0].int_value(), Some(value));
    }

    #[test]
    fn positions_are_one_based(source in "\\PC*") {
        let mut handler = Handler::new();
        let tokens = Lexer::new(&source, &mut handler).tokenize();
        for token in &tokens {
            prop_assert!(token.line >= 1);
            prop_assert!(token.column >= 1);
        }
    }
}
