//! Expression parsing by precedence climbing.
//!
//! One recursive function, [`Parser::parse_expr_bp`], drives all binary,
//! ternary, and assignment forms. Each operator has a binding power; the
//! loop consumes operators whose left binding power is at least the current
//! minimum, recursing with `bp + 1` for left-associative operators and `bp`
//! for right-associative ones (assignment, `?:`).
//!
//! # Operator binding powers (higher = tighter)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 2 | `=` `+=` `-=` `*=` `/=` `%=` `&=` `\|=` `^=` `<<=` `>>=` | Right |
//! | 4 | `?:` | Right |
//! | 6 | `\|\|` | Left |
//! | 8 | `&&` | Left |
//! | 10 | `\|` | Left |
//! | 12 | `^` | Left |
//! | 14 | `&` | Left |
//! | 16 | `==` `!=` | Left |
//! | 18 | `<` `<=` `>` `>=` | Left |
//! | 20 | `<<` `>>` | Left |
//! | 22 | `+` `-` | Left |
//! | 24 | `*` `/` `%` | Left |
//! | 26 | prefix `-` `~` `!` `+` `++` `--` | - |
//! | 28 | postfix `++` `--`, call | - |
//!
//! Postfix binds tighter than prefix: `-a++` is `-(a++)` and `++a--` is
//! `++(a--)` (the latter is then rejected by lvalue verification).

use crate::ast::{BinaryOp, Expr, PostfixOp, UnaryOp};
use crate::{ParseError, Parser};
use mcc_lex::TokenKind;

/// Binding power levels. Higher numbers bind tighter.
pub(crate) mod bp {
    /// Minimum binding power (start of a full expression).
    pub const MIN: u8 = 0;

    /// Assignment operators (right-associative).
    pub const ASSIGN: u8 = 2;

    /// Ternary conditional (right-associative).
    pub const TERNARY: u8 = 4;

    /// Logical OR: `||`.
    pub const LOGICAL_OR: u8 = 6;

    /// Logical AND: `&&`.
    pub const LOGICAL_AND: u8 = 8;

    /// Bitwise OR: `|`.
    pub const BITWISE_OR: u8 = 10;

    /// Bitwise XOR: `^`.
    pub const BITWISE_XOR: u8 = 12;

    /// Bitwise AND: `&`.
    pub const BITWISE_AND: u8 = 14;

    /// Equality: `==`, `!=`.
    pub const EQUALITY: u8 = 16;

    /// Relational: `<`, `<=`, `>`, `>=`.
    pub const COMPARISON: u8 = 18;

    /// Shift: `<<`, `>>`.
    pub const SHIFT: u8 = 20;

    /// Additive: `+`, `-`.
    pub const ADDITIVE: u8 = 22;

    /// Multiplicative: `*`, `/`, `%`.
    pub const MULTIPLICATIVE: u8 = 24;

    /// Prefix operators.
    pub const PREFIX: u8 = 26;
}

/// Maps a token to its binary operator and left binding power.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::LogicalOr => (BinaryOp::Or, bp::LOGICAL_OR),
        TokenKind::LogicalAnd => (BinaryOp::And, bp::LOGICAL_AND),
        TokenKind::Pipe => (BinaryOp::BitOr, bp::BITWISE_OR),
        TokenKind::Caret => (BinaryOp::BitXor, bp::BITWISE_XOR),
        TokenKind::Ampersand => (BinaryOp::BitAnd, bp::BITWISE_AND),
        TokenKind::Equal => (BinaryOp::Eq, bp::EQUALITY),
        TokenKind::NotEqual => (BinaryOp::Ne, bp::EQUALITY),
        TokenKind::Less => (BinaryOp::Lt, bp::COMPARISON),
        TokenKind::LessEqual => (BinaryOp::Le, bp::COMPARISON),
        TokenKind::Greater => (BinaryOp::Gt, bp::COMPARISON),
        TokenKind::GreaterEqual => (BinaryOp::Ge, bp::COMPARISON),
        TokenKind::LeftShift => (BinaryOp::Shl, bp::SHIFT),
        TokenKind::RightShift => (BinaryOp::Shr, bp::SHIFT),
        TokenKind::Plus => (BinaryOp::Add, bp::ADDITIVE),
        TokenKind::Minus => (BinaryOp::Sub, bp::ADDITIVE),
        TokenKind::Star => (BinaryOp::Mul, bp::MULTIPLICATIVE),
        TokenKind::Slash => (BinaryOp::Div, bp::MULTIPLICATIVE),
        TokenKind::Percent => (BinaryOp::Rem, bp::MULTIPLICATIVE),
        _ => return None,
    };
    Some(entry)
}

/// Maps a compound-assignment token to its underlying binary operator.
/// Plain `=` maps to `None`.
fn compound_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Assign => None,
        TokenKind::PlusAssign => Some(BinaryOp::Add),
        TokenKind::MinusAssign => Some(BinaryOp::Sub),
        TokenKind::StarAssign => Some(BinaryOp::Mul),
        TokenKind::SlashAssign => Some(BinaryOp::Div),
        TokenKind::PercentAssign => Some(BinaryOp::Rem),
        TokenKind::AmpAssign => Some(BinaryOp::BitAnd),
        TokenKind::PipeAssign => Some(BinaryOp::BitOr),
        TokenKind::CaretAssign => Some(BinaryOp::BitXor),
        TokenKind::LeftShiftAssign => Some(BinaryOp::Shl),
        TokenKind::RightShiftAssign => Some(BinaryOp::Shr),
        _ => unreachable!("not an assignment operator"),
    }
}

impl<'a> Parser<'a> {
    /// Parses a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(bp::MIN)
    }

    /// The precedence-climbing core.
    ///
    /// Parses a prefix expression, then folds in operators whose left
    /// binding power is at least `min_bp`.
    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind;

            if kind.is_assignment_op() {
                if bp::ASSIGN < min_bp {
                    break;
                }
                let op = compound_op(kind);
                self.advance();
                // Right-associative: recurse at the same binding power.
                let rhs = self.parse_expr_bp(bp::ASSIGN)?;
                lhs = Expr::Assignment {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                continue;
            }

            if kind == TokenKind::Question {
                if bp::TERNARY < min_bp {
                    break;
                }
                self.advance();
                // The middle operand is a full expression, the else branch
                // recurses right-associatively at ternary level.
                let then_expr = self.parse_expr_bp(bp::MIN)?;
                self.expect(TokenKind::Colon, "conditional expression")?;
                let else_expr = self.parse_expr_bp(bp::TERNARY)?;
                lhs = Expr::Conditional {
                    cond: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                };
                continue;
            }

            match binary_op(kind) {
                Some((op, l_bp)) if l_bp >= min_bp => {
                    self.advance();
                    // Left-associative: recurse one level tighter.
                    let rhs = self.parse_expr_bp(l_bp + 1)?;
                    lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }

        Ok(lhs)
    }

    /// Parses a prefix expression: unary operators applied to a postfix
    /// expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Tilde => UnaryOp::Complement,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::PlusPlus => UnaryOp::PrefixInc,
            TokenKind::MinusMinus => UnaryOp::PrefixDec,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_expr_bp(bp::PREFIX)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    /// Parses a primary expression followed by its postfix operators
    /// (`++`, `--`, call).
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek().kind {
                TokenKind::PlusPlus => {
                    self.advance();
                    expr = Expr::Postfix(PostfixOp::Inc, Box::new(expr));
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    expr = Expr::Postfix(PostfixOp::Dec, Box::new(expr));
                }
                TokenKind::OpenParen => {
                    let name = match &expr {
                        Expr::Var(name) => name.clone(),
                        _ => return Err(self.error("postfix operator", "call of non-function")),
                    };
                    self.advance();
                    let args = self.parse_call_args()?;
                    expr = Expr::FunctionCall { name, args };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parses the argument list of a call, after the `(` was consumed.
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.eat(TokenKind::CloseParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::CloseParen, "call arguments")?;
        Ok(args)
    }

    /// Parses a primary expression: constant, variable, or parenthesized
    /// expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind {
            TokenKind::IntLiteral => {
                let token = self.advance();
                let value = token
                    .int_value()
                    .expect("int literal token without value");
                Ok(Expr::Constant(value))
            }
            TokenKind::Identifier => {
                let name = self.advance().lexeme.clone();
                Ok(Expr::Var(name))
            }
            TokenKind::OpenParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::CloseParen, "parenthesized expression")?;
                Ok(expr)
            }
            kind if kind.is_literal() => {
                Err(self.error("integer constant", "literal kind not supported"))
            }
            _ => Err(self.error("expression", "expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use mcc_util::Handler;

    /// Parses a single expression out of a bare source snippet.
    fn parse_expr_source(source: &str) -> Result<Expr, ParseError> {
        let mut handler = Handler::new();
        let tokens = mcc_lex::Lexer::new(source, &mut handler).tokenize();
        assert!(!handler.has_errors(), "lex errors in test input");
        Parser::new(&tokens).parse_expr()
    }

    fn expr(source: &str) -> Expr {
        parse_expr_source(source).unwrap()
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    // =========================================================================
    // PRIMARY TESTS
    // =========================================================================

    #[test]
    fn test_constant() {
        assert_eq!(expr("42"), Expr::Constant(42));
    }

    #[test]
    fn test_variable() {
        assert_eq!(expr("x"), var("x"));
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(expr("(5)"), Expr::Constant(5));
        assert_eq!(expr("((((5))))"), Expr::Constant(5));
    }

    #[test]
    fn test_deeply_nested_parens() {
        let depth = 120;
        let source = format!("{}7{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(expr(&source), Expr::Constant(7));
    }

    #[test]
    fn test_unsupported_literal_kind() {
        let err = parse_expr_source("3.5").unwrap_err();
        assert_eq!(err.message, "literal kind not supported");
    }

    // =========================================================================
    // PRECEDENCE TESTS
    // =========================================================================

    #[test]
    fn test_mul_binds_tighter_than_add() {
        assert_eq!(
            expr("1 + 2 * 3"),
            binary(
                BinaryOp::Add,
                Expr::Constant(1),
                binary(BinaryOp::Mul, Expr::Constant(2), Expr::Constant(3))
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            expr("10 - 4 - 3"),
            binary(
                BinaryOp::Sub,
                binary(BinaryOp::Sub, Expr::Constant(10), Expr::Constant(4)),
                Expr::Constant(3)
            )
        );
    }

    #[test]
    fn test_parens_override_precedence() {
        assert_eq!(
            expr("(1 + 2) * 3"),
            binary(
                BinaryOp::Mul,
                binary(BinaryOp::Add, Expr::Constant(1), Expr::Constant(2)),
                Expr::Constant(3)
            )
        );
    }

    #[test]
    fn test_shift_between_additive_and_relational() {
        // a + b << c < d parses as ((a + b) << c) < d
        assert_eq!(
            expr("a + b << c < d"),
            binary(
                BinaryOp::Lt,
                binary(
                    BinaryOp::Shl,
                    binary(BinaryOp::Add, var("a"), var("b")),
                    var("c")
                ),
                var("d")
            )
        );
    }

    #[test]
    fn test_bitwise_precedence_chain() {
        // a & b ^ c | d parses as ((a & b) ^ c) | d
        assert_eq!(
            expr("a & b ^ c | d"),
            binary(
                BinaryOp::BitOr,
                binary(
                    BinaryOp::BitXor,
                    binary(BinaryOp::BitAnd, var("a"), var("b")),
                    var("c")
                ),
                var("d")
            )
        );
    }

    #[test]
    fn test_logical_precedence() {
        // 1 && 0 || 1 parses as (1 && 0) || 1
        assert_eq!(
            expr("1 && 0 || 1"),
            binary(
                BinaryOp::Or,
                binary(BinaryOp::And, Expr::Constant(1), Expr::Constant(0)),
                Expr::Constant(1)
            )
        );
    }

    #[test]
    fn test_comparison_vs_equality() {
        // a < b == c < d parses as (a < b) == (c < d)
        assert_eq!(
            expr("a < b == c < d"),
            binary(
                BinaryOp::Eq,
                binary(BinaryOp::Lt, var("a"), var("b")),
                binary(BinaryOp::Lt, var("c"), var("d"))
            )
        );
    }

    // =========================================================================
    // UNARY AND POSTFIX TESTS
    // =========================================================================

    #[test]
    fn test_unary_operators() {
        assert_eq!(
            expr("~(-3)"),
            Expr::Unary(
                UnaryOp::Complement,
                Box::new(Expr::Unary(UnaryOp::Negate, Box::new(Expr::Constant(3))))
            )
        );
        assert_eq!(
            expr("!x"),
            Expr::Unary(UnaryOp::Not, Box::new(var("x")))
        );
        assert_eq!(
            expr("+x"),
            Expr::Unary(UnaryOp::Plus, Box::new(var("x")))
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        assert_eq!(
            expr("-a * b"),
            binary(
                BinaryOp::Mul,
                Expr::Unary(UnaryOp::Negate, Box::new(var("a"))),
                var("b")
            )
        );
    }

    #[test]
    fn test_prefix_inc_dec() {
        assert_eq!(
            expr("++x"),
            Expr::Unary(UnaryOp::PrefixInc, Box::new(var("x")))
        );
        assert_eq!(
            expr("--x"),
            Expr::Unary(UnaryOp::PrefixDec, Box::new(var("x")))
        );
    }

    #[test]
    fn test_postfix_inc_dec() {
        assert_eq!(
            expr("x++"),
            Expr::Postfix(PostfixOp::Inc, Box::new(var("x")))
        );
        assert_eq!(
            expr("x--"),
            Expr::Postfix(PostfixOp::Dec, Box::new(var("x")))
        );
    }

    #[test]
    fn test_postfix_binds_tighter_than_prefix() {
        // -a++ is -(a++)
        assert_eq!(
            expr("-a++"),
            Expr::Unary(
                UnaryOp::Negate,
                Box::new(Expr::Postfix(PostfixOp::Inc, Box::new(var("a"))))
            )
        );
    }

    #[test]
    fn test_call() {
        assert_eq!(
            expr("f()"),
            Expr::FunctionCall {
                name: "f".to_string(),
                args: vec![]
            }
        );
        assert_eq!(
            expr("f(1, x + 2)"),
            Expr::FunctionCall {
                name: "f".to_string(),
                args: vec![
                    Expr::Constant(1),
                    binary(BinaryOp::Add, var("x"), Expr::Constant(2))
                ]
            }
        );
    }

    // =========================================================================
    // ASSIGNMENT AND TERNARY TESTS
    // =========================================================================

    #[test]
    fn test_simple_assignment() {
        assert_eq!(
            expr("a = 5"),
            Expr::Assignment {
                op: None,
                lhs: Box::new(var("a")),
                rhs: Box::new(Expr::Constant(5)),
            }
        );
    }

    #[test]
    fn test_assignment_is_right_associative() {
        // a = b = c parses as a = (b = c)
        assert_eq!(
            expr("a = b = c"),
            Expr::Assignment {
                op: None,
                lhs: Box::new(var("a")),
                rhs: Box::new(Expr::Assignment {
                    op: None,
                    lhs: Box::new(var("b")),
                    rhs: Box::new(var("c")),
                }),
            }
        );
    }

    #[test]
    fn test_compound_assignment_carries_operator() {
        let Expr::Assignment { op, .. } = expr("a += 3") else {
            panic!("expected assignment");
        };
        assert_eq!(op, Some(BinaryOp::Add));

        let Expr::Assignment { op, .. } = expr("a <<= 1") else {
            panic!("expected assignment");
        };
        assert_eq!(op, Some(BinaryOp::Shl));
    }

    #[test]
    fn test_assignment_binds_loosest() {
        // a = 1 + 2 parses as a = (1 + 2)
        assert_eq!(
            expr("a = 1 + 2"),
            Expr::Assignment {
                op: None,
                lhs: Box::new(var("a")),
                rhs: Box::new(binary(BinaryOp::Add, Expr::Constant(1), Expr::Constant(2))),
            }
        );
    }

    #[test]
    fn test_ternary() {
        assert_eq!(
            expr("a ? 1 : 2"),
            Expr::Conditional {
                cond: Box::new(var("a")),
                then_expr: Box::new(Expr::Constant(1)),
                else_expr: Box::new(Expr::Constant(2)),
            }
        );
    }

    #[test]
    fn test_ternary_is_right_associative() {
        // a ? 1 : b ? 2 : 3 parses as a ? 1 : (b ? 2 : 3)
        assert_eq!(
            expr("a ? 1 : b ? 2 : 3"),
            Expr::Conditional {
                cond: Box::new(var("a")),
                then_expr: Box::new(Expr::Constant(1)),
                else_expr: Box::new(Expr::Conditional {
                    cond: Box::new(var("b")),
                    then_expr: Box::new(Expr::Constant(2)),
                    else_expr: Box::new(Expr::Constant(3)),
                }),
            }
        );
    }

    #[test]
    fn test_ternary_middle_allows_assignment() {
        // a ? b = 1 : 2 is legal; the middle operand is a full expression
        let Expr::Conditional { then_expr, .. } = expr("a ? b = 1 : 2") else {
            panic!("expected conditional");
        };
        assert!(matches!(*then_expr, Expr::Assignment { .. }));
    }

    #[test]
    fn test_ternary_condition_groups_binary() {
        // a || b ? 1 : 2 parses as (a || b) ? 1 : 2
        assert_eq!(
            expr("a || b ? 1 : 2"),
            Expr::Conditional {
                cond: Box::new(binary(BinaryOp::Or, var("a"), var("b"))),
                then_expr: Box::new(Expr::Constant(1)),
                else_expr: Box::new(Expr::Constant(2)),
            }
        );
    }

    // =========================================================================
    // ERROR TESTS
    // =========================================================================

    #[test]
    fn test_missing_operand() {
        let err = parse_expr_source("1 +").unwrap_err();
        assert_eq!(err.expected, "expression");
    }

    #[test]
    fn test_unclosed_paren() {
        let err = parse_expr_source("(1 + 2").unwrap_err();
        assert_eq!(err.expected, "')'");
    }

    #[test]
    fn test_missing_ternary_colon() {
        let err = parse_expr_source("a ? 1 2").unwrap_err();
        assert_eq!(err.expected, "':'");
    }
}
