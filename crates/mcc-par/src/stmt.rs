//! Statement and declaration parsing by recursive descent.
//!
//! Each statement form has one parse function, dispatched on the leading
//! token. A labeled statement (`name: stmt`) is recognized with one token
//! of lookahead to distinguish it from an expression statement starting
//! with the same identifier.

use crate::ast::{BlockItem, Declaration, ForInit, Stmt};
use crate::expr::bp;
use crate::{ParseError, Parser};
use mcc_lex::TokenKind;

impl<'a> Parser<'a> {
    /// Parses one block item: a declaration or a statement.
    pub(crate) fn parse_block_item(&mut self) -> Result<BlockItem, ParseError> {
        match self.peek().kind {
            TokenKind::KwInt => Ok(BlockItem::Declaration(self.parse_declaration()?)),
            TokenKind::KwLong
            | TokenKind::KwUnsigned
            | TokenKind::KwSigned
            | TokenKind::KwDouble
            | TokenKind::KwStatic
            | TokenKind::KwExtern => {
                Err(self.error("'int'", "unsupported declaration specifier"))
            }
            _ => Ok(BlockItem::Statement(self.parse_statement()?)),
        }
    }

    /// Parses `int name ( = expr )? ;`.
    pub(crate) fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.expect(TokenKind::KwInt, "declaration")?;
        let name = self.expect_identifier("declaration")?;
        let init = if self.eat(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "declaration")?;
        Ok(Declaration { name, init })
    }

    /// Parses one statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Null)
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::OpenBrace => self.parse_compound(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwDo => self.parse_do_while(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwBreak => {
                self.advance();
                self.expect(TokenKind::Semicolon, "break statement")?;
                Ok(Stmt::Break { label: None })
            }
            TokenKind::KwContinue => {
                self.advance();
                self.expect(TokenKind::Semicolon, "continue statement")?;
                Ok(Stmt::Continue { label: None })
            }
            TokenKind::KwGoto => {
                self.advance();
                let target = self.expect_identifier("goto statement")?;
                self.expect(TokenKind::Semicolon, "goto statement")?;
                Ok(Stmt::Goto(target))
            }
            TokenKind::KwSwitch => self.parse_switch(),
            TokenKind::KwCase => self.parse_case(),
            TokenKind::KwDefault => self.parse_default(),
            TokenKind::Identifier if self.peek_ahead(1).kind == TokenKind::Colon => {
                let name = self.advance().lexeme.clone();
                self.advance(); // ':'
                let stmt = self.parse_statement()?;
                Ok(Stmt::Label {
                    name,
                    stmt: Box::new(stmt),
                })
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "expression statement")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "return statement")?;
        Ok(Stmt::Return(expr))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(TokenKind::OpenParen, "if statement")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "if statement")?;
        let then_stmt = Box::new(self.parse_statement()?);
        let else_stmt = if self.eat(TokenKind::KwElse) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_stmt,
            else_stmt,
        })
    }

    fn parse_compound(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let mut items = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            items.push(self.parse_block_item()?);
        }
        self.expect(TokenKind::CloseBrace, "compound statement")?;
        Ok(Stmt::Compound(items))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(TokenKind::OpenParen, "while statement")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "while statement")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::While {
            cond,
            body,
            label: None,
        })
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let body = Box::new(self.parse_statement()?);
        self.expect(TokenKind::KwWhile, "do-while statement")?;
        self.expect(TokenKind::OpenParen, "do-while statement")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "do-while statement")?;
        self.expect(TokenKind::Semicolon, "do-while statement")?;
        Ok(Stmt::DoWhile {
            body,
            cond,
            label: None,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(TokenKind::OpenParen, "for statement")?;

        let init = if self.eat(TokenKind::Semicolon) {
            ForInit::None
        } else if self.check(TokenKind::KwInt) {
            // parse_declaration consumes the terminating semicolon.
            ForInit::Declaration(self.parse_declaration()?)
        } else {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "for initializer")?;
            ForInit::Expression(expr)
        };

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "for condition")?;

        let post = if self.check(TokenKind::CloseParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::CloseParen, "for statement")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            cond,
            post,
            body,
            label: None,
        })
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(TokenKind::OpenParen, "switch statement")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::CloseParen, "switch statement")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::Switch {
            cond,
            body,
            label: None,
            cases: Vec::new(),
            default_label: None,
        })
    }

    fn parse_case(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        // A case value is a conditional expression; assignment is excluded.
        let value = self.parse_expr_bp(bp::TERNARY)?;
        self.expect(TokenKind::Colon, "case statement")?;
        let stmt = Box::new(self.parse_statement()?);
        Ok(Stmt::Case {
            value,
            stmt,
            label: None,
        })
    }

    fn parse_default(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        self.expect(TokenKind::Colon, "default statement")?;
        let stmt = Box::new(self.parse_statement()?);
        Ok(Stmt::Default { stmt, label: None })
    }
}
