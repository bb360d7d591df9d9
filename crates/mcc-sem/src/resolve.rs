//! Variable resolution and lvalue verification.
//!
//! Variable resolution rewrites every `Var` node's name to a unique name
//! (`x` becomes `x.0`), pushing a scope frame per compound statement and
//! per `for` header. After this pass, every variable in the function body
//! refers to exactly one declaration.
//!
//! Lvalue verification runs on the resolved tree and checks that every
//! assignment target and every `++`/`--` operand denotes a storage
//! location. In this subset only `Var` qualifies.

use crate::scope::{Declared, NameGenerator, ScopeStack};
use crate::SemanticError;
use mcc_par::ast::{BlockItem, Declaration, Expr, ForInit, Function, Stmt, UnaryOp};

/// Renames every declared variable and reference to a unique name.
pub struct VariableResolver {
    scopes: ScopeStack,
    names: NameGenerator,
    errors: Vec<SemanticError>,
}

impl VariableResolver {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            names: NameGenerator::new(),
            errors: Vec::new(),
        }
    }

    /// Runs the pass over a function body, returning accumulated errors.
    pub fn run(mut self, function: &mut Function) -> Vec<SemanticError> {
        for item in &mut function.body {
            self.block_item(item);
        }
        self.errors
    }

    fn block_item(&mut self, item: &mut BlockItem) {
        match item {
            BlockItem::Declaration(decl) => self.declaration(decl),
            BlockItem::Statement(stmt) => self.stmt(stmt),
        }
    }

    fn declaration(&mut self, decl: &mut Declaration) {
        match self.scopes.declare(&decl.name, &mut self.names) {
            Declared::Unique(unique) => decl.name = unique,
            Declared::Duplicate => {
                self.errors
                    .push(SemanticError::DuplicateDeclaration(decl.name.clone()));
            }
        }
        // The initializer may refer to the variable being declared
        // (`int a = a;` resolves, then misbehaves at runtime as in C).
        if let Some(init) = &mut decl.init {
            self.expr(init);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Return(expr) | Stmt::Expression(expr) => self.expr(expr),
            Stmt::Null | Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Goto(_) => {}
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.expr(cond);
                self.stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.stmt(else_stmt);
                }
            }
            Stmt::Compound(items) => {
                self.scopes.push();
                for item in items {
                    self.block_item(item);
                }
                self.scopes.pop();
            }
            Stmt::While { cond, body, .. } => {
                self.expr(cond);
                self.stmt(body);
            }
            Stmt::DoWhile { body, cond, .. } => {
                self.stmt(body);
                self.expr(cond);
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                // The for header opens its own scope around the whole loop.
                self.scopes.push();
                match init {
                    ForInit::Declaration(decl) => self.declaration(decl),
                    ForInit::Expression(expr) => self.expr(expr),
                    ForInit::None => {}
                }
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                if let Some(post) = post {
                    self.expr(post);
                }
                self.stmt(body);
                self.scopes.pop();
            }
            Stmt::Label { stmt, .. } => self.stmt(stmt),
            Stmt::Switch { cond, body, .. } => {
                self.expr(cond);
                self.stmt(body);
            }
            Stmt::Case { value, stmt, .. } => {
                self.expr(value);
                self.stmt(stmt);
            }
            Stmt::Default { stmt, .. } => self.stmt(stmt),
        }
    }

    fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Constant(_) => {}
            Expr::Var(name) => match self.scopes.lookup(name) {
                Some(unique) => *name = unique.to_string(),
                None => {
                    self.errors
                        .push(SemanticError::UndeclaredVariable(name.clone()));
                }
            },
            Expr::Unary(_, operand) | Expr::Postfix(_, operand) => self.expr(operand),
            Expr::Binary(_, lhs, rhs) => {
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Assignment { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.expr(cond);
                self.expr(then_expr);
                self.expr(else_expr);
            }
            // Function names live in a separate namespace. With a single
            // function per translation unit and no declarations, every call
            // target is undefined.
            Expr::FunctionCall { name, args } => {
                self.errors
                    .push(SemanticError::UndefinedFunction(name.clone()));
                for arg in args {
                    self.expr(arg);
                }
            }
        }
    }
}

/// Checks assignment targets and `++`/`--` operands on the resolved tree.
pub struct LvalueVerifier {
    errors: Vec<SemanticError>,
}

impl LvalueVerifier {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn run(mut self, function: &Function) -> Vec<SemanticError> {
        for item in &function.body {
            self.block_item(item);
        }
        self.errors
    }

    fn block_item(&mut self, item: &BlockItem) {
        match item {
            BlockItem::Declaration(decl) => {
                if let Some(init) = &decl.init {
                    self.expr(init);
                }
            }
            BlockItem::Statement(stmt) => self.stmt(stmt),
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Return(expr) | Stmt::Expression(expr) => self.expr(expr),
            Stmt::Null | Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Goto(_) => {}
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.expr(cond);
                self.stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.stmt(else_stmt);
                }
            }
            Stmt::Compound(items) => {
                for item in items {
                    self.block_item(item);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.expr(cond);
                self.stmt(body);
            }
            Stmt::DoWhile { body, cond, .. } => {
                self.stmt(body);
                self.expr(cond);
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                match init {
                    ForInit::Declaration(decl) => {
                        if let Some(init) = &decl.init {
                            self.expr(init);
                        }
                    }
                    ForInit::Expression(expr) => self.expr(expr),
                    ForInit::None => {}
                }
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                if let Some(post) = post {
                    self.expr(post);
                }
                self.stmt(body);
            }
            Stmt::Label { stmt, .. } => self.stmt(stmt),
            Stmt::Switch { cond, body, .. } => {
                self.expr(cond);
                self.stmt(body);
            }
            Stmt::Case { value, stmt, .. } => {
                self.expr(value);
                self.stmt(stmt);
            }
            Stmt::Default { stmt, .. } => self.stmt(stmt),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Constant(_) | Expr::Var(_) => {}
            Expr::Unary(op, operand) => {
                if matches!(op, UnaryOp::PrefixInc | UnaryOp::PrefixDec)
                    && !operand.is_lvalue()
                {
                    self.errors.push(SemanticError::NotAnLvalue);
                }
                self.expr(operand);
            }
            Expr::Postfix(_, operand) => {
                if !operand.is_lvalue() {
                    self.errors.push(SemanticError::NotAnLvalue);
                }
                self.expr(operand);
            }
            Expr::Binary(_, lhs, rhs) => {
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Assignment { lhs, rhs, .. } => {
                if !lhs.is_lvalue() {
                    self.errors.push(SemanticError::NotAnLvalue);
                }
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.expr(cond);
                self.expr(then_expr);
                self.expr(else_expr);
            }
            Expr::FunctionCall { args, .. } => {
                for arg in args {
                    self.expr(arg);
                }
            }
        }
    }
}
