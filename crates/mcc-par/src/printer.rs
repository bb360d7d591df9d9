//! AST printers.
//!
//! Two renderings live here. [`print_program`] backs the driver's
//! `--printAst` flag and dumps the tree one node per line:
//!
//! ```text
//! Program(
//!   Function(
//!     name="main",
//!     body=[
//!       Return(
//!         Constant(2)
//!       )
//!     ]
//!   )
//! )
//! ```
//!
//! [`print_source`] is the canonical printer: it renders the tree back to
//! source text the parser accepts, with every composite expression fully
//! parenthesized. For any tree the parser produced, re-parsing the printed
//! text reconstructs the same tree.

use crate::ast::{BlockItem, Declaration, Expr, ForInit, PostfixOp, Program, Stmt, UnaryOp};

/// Renders a program as an indented tree.
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new();
    printer.line("Program(");
    printer.indented(|p| {
        p.line("Function(");
        p.indented(|p| {
            p.line(&format!("name=\"{}\",", program.function.name));
            p.line("body=[");
            p.indented(|p| {
                for item in &program.function.body {
                    p.block_item(item);
                }
            });
            p.line("]");
        });
        p.line(")");
    });
    printer.line(")");
    printer.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn block_item(&mut self, item: &BlockItem) {
        match item {
            BlockItem::Declaration(decl) => self.declaration(decl),
            BlockItem::Statement(stmt) => self.stmt(stmt),
        }
    }

    fn declaration(&mut self, decl: &Declaration) {
        match &decl.init {
            Some(init) => {
                self.line(&format!("Declare(\"{}\",", decl.name));
                self.indented(|p| p.expr(init));
                self.line(")");
            }
            None => self.line(&format!("Declare(\"{}\")", decl.name)),
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Return(expr) => {
                self.line("Return(");
                self.indented(|p| p.expr(expr));
                self.line(")");
            }
            Stmt::Expression(expr) => {
                self.line("Expression(");
                self.indented(|p| p.expr(expr));
                self.line(")");
            }
            Stmt::Null => self.line("Null"),
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.line("If(");
                self.indented(|p| {
                    p.expr(cond);
                    p.stmt(then_stmt);
                    if let Some(else_stmt) = else_stmt {
                        p.stmt(else_stmt);
                    }
                });
                self.line(")");
            }
            Stmt::Compound(items) => {
                self.line("Compound([");
                self.indented(|p| {
                    for item in items {
                        p.block_item(item);
                    }
                });
                self.line("])");
            }
            Stmt::While { cond, body, .. } => {
                self.line("While(");
                self.indented(|p| {
                    p.expr(cond);
                    p.stmt(body);
                });
                self.line(")");
            }
            Stmt::DoWhile { body, cond, .. } => {
                self.line("DoWhile(");
                self.indented(|p| {
                    p.stmt(body);
                    p.expr(cond);
                });
                self.line(")");
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                self.line("For(");
                self.indented(|p| {
                    match init {
                        ForInit::Declaration(decl) => p.declaration(decl),
                        ForInit::Expression(expr) => p.expr(expr),
                        ForInit::None => p.line("NoInit"),
                    }
                    match cond {
                        Some(cond) => p.expr(cond),
                        None => p.line("NoCondition"),
                    }
                    match post {
                        Some(post) => p.expr(post),
                        None => p.line("NoPost"),
                    }
                    p.stmt(body);
                });
                self.line(")");
            }
            Stmt::Break { .. } => self.line("Break"),
            Stmt::Continue { .. } => self.line("Continue"),
            Stmt::Goto(target) => self.line(&format!("Goto(\"{}\")", target)),
            Stmt::Label { name, stmt } => {
                self.line(&format!("Label(\"{}\",", name));
                self.indented(|p| p.stmt(stmt));
                self.line(")");
            }
            Stmt::Switch { cond, body, .. } => {
                self.line("Switch(");
                self.indented(|p| {
                    p.expr(cond);
                    p.stmt(body);
                });
                self.line(")");
            }
            Stmt::Case { value, stmt, .. } => {
                self.line("Case(");
                self.indented(|p| {
                    p.expr(value);
                    p.stmt(stmt);
                });
                self.line(")");
            }
            Stmt::Default { stmt, .. } => {
                self.line("Default(");
                self.indented(|p| p.stmt(stmt));
                self.line(")");
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Constant(value) => self.line(&format!("Constant({})", value)),
            Expr::Var(name) => self.line(&format!("Var(\"{}\")", name)),
            Expr::Unary(op, operand) => {
                let name = match op {
                    UnaryOp::Complement => "Complement",
                    UnaryOp::Negate => "Negate",
                    UnaryOp::Not => "Not",
                    UnaryOp::Plus => "Plus",
                    UnaryOp::PrefixInc => "PrefixInc",
                    UnaryOp::PrefixDec => "PrefixDec",
                };
                self.line(&format!("Unary({},", name));
                self.indented(|p| p.expr(operand));
                self.line(")");
            }
            Expr::Postfix(op, operand) => {
                let name = match op {
                    PostfixOp::Inc => "PostfixInc",
                    PostfixOp::Dec => "PostfixDec",
                };
                self.line(&format!("Postfix({},", name));
                self.indented(|p| p.expr(operand));
                self.line(")");
            }
            Expr::Binary(op, lhs, rhs) => {
                self.line(&format!("Binary(\"{}\",", op));
                self.indented(|p| {
                    p.expr(lhs);
                    p.expr(rhs);
                });
                self.line(")");
            }
            Expr::Assignment { op, lhs, rhs } => {
                match op {
                    Some(op) => self.line(&format!("Assign(\"{}=\",", op)),
                    None => self.line("Assign(\"=\","),
                }
                self.indented(|p| {
                    p.expr(lhs);
                    p.expr(rhs);
                });
                self.line(")");
            }
            Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.line("Conditional(");
                self.indented(|p| {
                    p.expr(cond);
                    p.expr(then_expr);
                    p.expr(else_expr);
                });
                self.line(")");
            }
            Expr::FunctionCall { name, args } => {
                self.line(&format!("Call(\"{}\",", name));
                self.indented(|p| {
                    for arg in args {
                        p.expr(arg);
                    }
                });
                self.line(")");
            }
        }
    }
}

/// Renders a program back to parseable source text.
///
/// Composite expressions are fully parenthesized, so precedence and
/// associativity are carried by the text itself and a re-parse rebuilds
/// the original tree node for node. Labels attached by the semantic
/// passes are not printed; the round trip is defined on parse trees.
pub fn print_source(program: &Program) -> String {
    let mut writer = SourceWriter::new();
    writer.line(&format!("int {}(void)", program.function.name));
    writer.line("{");
    writer.indent += 1;
    for item in &program.function.body {
        writer.block_item(item);
    }
    writer.indent -= 1;
    writer.line("}");
    writer.out
}

struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented_stmt(&mut self, stmt: &Stmt) {
        self.indent += 1;
        self.stmt(stmt);
        self.indent -= 1;
    }

    fn block_item(&mut self, item: &BlockItem) {
        match item {
            BlockItem::Declaration(decl) => {
                let text = declaration_text(decl);
                self.line(&text);
            }
            BlockItem::Statement(stmt) => self.stmt(stmt),
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Return(expr) => self.line(&format!("return {};", expr_text(expr))),
            Stmt::Expression(expr) => self.line(&format!("{};", expr_text(expr))),
            Stmt::Null => self.line(";"),
            Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.line(&format!("if ({})", expr_text(cond)));
                self.indented_stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.line("else");
                    self.indented_stmt(else_stmt);
                }
            }
            Stmt::Compound(items) => {
                self.line("{");
                self.indent += 1;
                for item in items {
                    self.block_item(item);
                }
                self.indent -= 1;
                self.line("}");
            }
            Stmt::While { cond, body, .. } => {
                self.line(&format!("while ({})", expr_text(cond)));
                self.indented_stmt(body);
            }
            Stmt::DoWhile { body, cond, .. } => {
                self.line("do");
                self.indented_stmt(body);
                self.line(&format!("while ({});", expr_text(cond)));
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                // The init clause carries its own semicolon, matching the
                // grammar where a for-header declaration consumes one.
                let init_text = match init {
                    ForInit::Declaration(decl) => declaration_text(decl),
                    ForInit::Expression(expr) => format!("{};", expr_text(expr)),
                    ForInit::None => ";".to_string(),
                };
                let cond_text = cond.as_ref().map(expr_text).unwrap_or_default();
                let post_text = post.as_ref().map(expr_text).unwrap_or_default();
                self.line(&format!("for ({} {}; {})", init_text, cond_text, post_text));
                self.indented_stmt(body);
            }
            Stmt::Break { .. } => self.line("break;"),
            Stmt::Continue { .. } => self.line("continue;"),
            Stmt::Goto(target) => self.line(&format!("goto {};", target)),
            Stmt::Label { name, stmt } => {
                self.line(&format!("{}:", name));
                self.stmt(stmt);
            }
            Stmt::Switch { cond, body, .. } => {
                self.line(&format!("switch ({})", expr_text(cond)));
                self.indented_stmt(body);
            }
            Stmt::Case { value, stmt, .. } => {
                self.line(&format!("case {}:", expr_text(value)));
                self.stmt(stmt);
            }
            Stmt::Default { stmt, .. } => {
                self.line("default:");
                self.stmt(stmt);
            }
        }
    }
}

fn declaration_text(decl: &Declaration) -> String {
    match &decl.init {
        Some(init) => format!("int {} = {};", decl.name, expr_text(init)),
        None => format!("int {};", decl.name),
    }
}

/// Renders an expression with full parenthesization of composites.
fn expr_text(expr: &Expr) -> String {
    match expr {
        Expr::Constant(value) => value.to_string(),
        Expr::Var(name) => name.clone(),
        Expr::Unary(op, operand) => {
            let symbol = match op {
                UnaryOp::Complement => "~",
                UnaryOp::Negate => "-",
                UnaryOp::Not => "!",
                UnaryOp::Plus => "+",
                UnaryOp::PrefixInc => "++",
                UnaryOp::PrefixDec => "--",
            };
            format!("({}{})", symbol, expr_text(operand))
        }
        Expr::Postfix(op, operand) => {
            let symbol = match op {
                PostfixOp::Inc => "++",
                PostfixOp::Dec => "--",
            };
            format!("({}{})", expr_text(operand), symbol)
        }
        Expr::Binary(op, lhs, rhs) => {
            format!("({} {} {})", expr_text(lhs), op, expr_text(rhs))
        }
        Expr::Assignment { op, lhs, rhs } => {
            let operator = match op {
                Some(op) => format!("{}=", op),
                None => "=".to_string(),
            };
            format!("({} {} {})", expr_text(lhs), operator, expr_text(rhs))
        }
        Expr::Conditional {
            cond,
            then_expr,
            else_expr,
        } => format!(
            "({} ? {} : {})",
            expr_text(cond),
            expr_text(then_expr),
            expr_text(else_expr)
        ),
        Expr::FunctionCall { name, args } => {
            let args: Vec<String> = args.iter().map(expr_text).collect();
            format!("{}({})", name, args.join(", "))
        }
    }
}
