//! AST to three-address IR lowering.
//!
//! Lowering walks the resolved AST depth-first, left to right, appending
//! instructions to the enclosing function. Expression lowering returns the
//! [`Value`] holding the result; statement lowering returns nothing.
//!
//! Side effects observe source order: operands are lowered left-then-right
//! and every assignment or increment emits at the point it is reached.
//!
//! Fresh names come from a context owned by the function being lowered,
//! not from process globals: temporaries are `tmp.N`, labels are
//! `prefix.N`. Loop control labels are derived from the labels the
//! semantic pass attached (`break.while.0`, `continue.while.0`).

use crate::tacky::{BinaryOp, Function, Instruction, Program, UnaryOp, Value};
use mcc_par::ast;

/// Lowers a whole program.
pub fn lower_program(program: &ast::Program) -> Program {
    Program {
        function: lower_function(&program.function),
    }
}

/// Lowers one function body into an instruction sequence.
pub fn lower_function(function: &ast::Function) -> Function {
    let mut lowerer = Lowerer::new();
    for item in &function.body {
        lowerer.block_item(item);
    }
    Function {
        name: function.name.clone(),
        instructions: lowerer.instructions,
    }
}

/// Lowering context for a single function.
struct Lowerer {
    instructions: Vec<Instruction>,
    tmp_counter: u32,
    label_counter: u32,
}

impl Lowerer {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            tmp_counter: 0,
            label_counter: 0,
        }
    }

    /// Mints a fresh temporary `tmp.N`.
    fn make_temp(&mut self) -> Value {
        let name = format!("tmp.{}", self.tmp_counter);
        self.tmp_counter += 1;
        Value::Var(name)
    }

    /// Mints a fresh label `prefix.N`.
    fn make_label(&mut self, prefix: &str) -> String {
        let label = format!("{}.{}", prefix, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn block_item(&mut self, item: &ast::BlockItem) {
        match item {
            ast::BlockItem::Declaration(decl) => self.declaration(decl),
            ast::BlockItem::Statement(stmt) => self.stmt(stmt),
        }
    }

    /// A declaration with an initializer lowers to a copy; without one it
    /// emits nothing (the variable exists once first written).
    fn declaration(&mut self, decl: &ast::Declaration) {
        if let Some(init) = &decl.init {
            let value = self.expr(init);
            self.emit(Instruction::Copy {
                src: value,
                dst: Value::Var(decl.name.clone()),
            });
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn stmt(&mut self, stmt: &ast::Stmt) {
        match stmt {
            ast::Stmt::Return(expr) => {
                let value = self.expr(expr);
                self.emit(Instruction::Return(value));
            }
            ast::Stmt::Expression(expr) => {
                // Lower for side effects, discard the result.
                self.expr(expr);
            }
            ast::Stmt::Null => {}
            ast::Stmt::If {
                cond,
                then_stmt,
                else_stmt,
            } => self.if_stmt(cond, then_stmt, else_stmt.as_deref()),
            ast::Stmt::Compound(items) => {
                for item in items {
                    self.block_item(item);
                }
            }
            ast::Stmt::While { cond, body, label } => {
                let label = expect_label(label);
                let continue_label = format!("continue.{}", label);
                let break_label = format!("break.{}", label);
                self.emit(Instruction::Label(continue_label.clone()));
                let cond = self.expr(cond);
                self.emit(Instruction::JumpIfZero {
                    cond,
                    target: break_label.clone(),
                });
                self.stmt(body);
                self.emit(Instruction::Jump(continue_label));
                self.emit(Instruction::Label(break_label));
            }
            ast::Stmt::DoWhile { body, cond, label } => {
                let label = expect_label(label);
                let start_label = format!("start.{}", label);
                let continue_label = format!("continue.{}", label);
                let break_label = format!("break.{}", label);
                self.emit(Instruction::Label(start_label.clone()));
                self.stmt(body);
                self.emit(Instruction::Label(continue_label));
                let cond = self.expr(cond);
                self.emit(Instruction::JumpIfNotZero {
                    cond,
                    target: start_label,
                });
                self.emit(Instruction::Label(break_label));
            }
            ast::Stmt::For {
                init,
                cond,
                post,
                body,
                label,
            } => {
                let label = expect_label(label);
                let start_label = format!("start.{}", label);
                let continue_label = format!("continue.{}", label);
                let break_label = format!("break.{}", label);
                match init {
                    ast::ForInit::Declaration(decl) => self.declaration(decl),
                    ast::ForInit::Expression(expr) => {
                        self.expr(expr);
                    }
                    ast::ForInit::None => {}
                }
                self.emit(Instruction::Label(start_label.clone()));
                if let Some(cond) = cond {
                    let cond = self.expr(cond);
                    self.emit(Instruction::JumpIfZero {
                        cond,
                        target: break_label.clone(),
                    });
                }
                self.stmt(body);
                self.emit(Instruction::Label(continue_label));
                if let Some(post) = post {
                    self.expr(post);
                }
                self.emit(Instruction::Jump(start_label));
                self.emit(Instruction::Label(break_label));
            }
            ast::Stmt::Break { label } => {
                let label = expect_label(label);
                self.emit(Instruction::Jump(format!("break.{}", label)));
            }
            ast::Stmt::Continue { label } => {
                let label = expect_label(label);
                self.emit(Instruction::Jump(format!("continue.{}", label)));
            }
            ast::Stmt::Goto(target) => {
                self.emit(Instruction::Jump(target.clone()));
            }
            ast::Stmt::Label { name, stmt } => {
                self.emit(Instruction::Label(name.clone()));
                self.stmt(stmt);
            }
            ast::Stmt::Switch {
                cond,
                body,
                label,
                cases,
                default_label,
            } => self.switch_stmt(cond, body, label, cases, default_label.as_deref()),
            ast::Stmt::Case { stmt, label, .. } | ast::Stmt::Default { stmt, label } => {
                let label = expect_label(label);
                self.emit(Instruction::Label(label.to_string()));
                self.stmt(stmt);
            }
        }
    }

    fn if_stmt(
        &mut self,
        cond: &ast::Expr,
        then_stmt: &ast::Stmt,
        else_stmt: Option<&ast::Stmt>,
    ) {
        let cond = self.expr(cond);
        match else_stmt {
            None => {
                let end_label = self.make_label("if_end");
                self.emit(Instruction::JumpIfZero {
                    cond,
                    target: end_label.clone(),
                });
                self.stmt(then_stmt);
                self.emit(Instruction::Label(end_label));
            }
            Some(else_stmt) => {
                let else_label = self.make_label("if_else");
                let end_label = self.make_label("if_end");
                self.emit(Instruction::JumpIfZero {
                    cond,
                    target: else_label.clone(),
                });
                self.stmt(then_stmt);
                self.emit(Instruction::Jump(end_label.clone()));
                self.emit(Instruction::Label(else_label));
                self.stmt(else_stmt);
                self.emit(Instruction::Label(end_label));
            }
        }
    }

    /// The scrutinee is evaluated once, then compared against each case
    /// value in source order; control falls to `default` (or past the
    /// switch) when nothing matches. Case bodies are lowered in place so
    /// fall-through comes for free.
    fn switch_stmt(
        &mut self,
        cond: &ast::Expr,
        body: &ast::Stmt,
        label: &Option<String>,
        cases: &[(i32, String)],
        default_label: Option<&str>,
    ) {
        let label = expect_label(label);
        let break_label = format!("break.{}", label);

        let scrutinee = self.expr(cond);
        for (value, case_label) in cases {
            let matched = self.make_temp();
            self.emit(Instruction::Binary {
                op: BinaryOp::Eq,
                src1: scrutinee.clone(),
                src2: Value::Constant(*value),
                dst: matched.clone(),
            });
            self.emit(Instruction::JumpIfNotZero {
                cond: matched,
                target: case_label.clone(),
            });
        }
        match default_label {
            Some(default_label) => self.emit(Instruction::Jump(default_label.to_string())),
            None => self.emit(Instruction::Jump(break_label.clone())),
        }

        self.stmt(body);
        self.emit(Instruction::Label(break_label));
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Lowers an expression, returning the value holding its result.
    fn expr(&mut self, expr: &ast::Expr) -> Value {
        match expr {
            ast::Expr::Constant(value) => Value::Constant(*value),
            ast::Expr::Var(name) => Value::Var(name.clone()),
            ast::Expr::Unary(ast::UnaryOp::Plus, operand) => {
                // Unary plus is a no-op.
                self.expr(operand)
            }
            ast::Expr::Unary(ast::UnaryOp::PrefixInc, operand) => {
                self.prefix_incdec(operand, BinaryOp::Add)
            }
            ast::Expr::Unary(ast::UnaryOp::PrefixDec, operand) => {
                self.prefix_incdec(operand, BinaryOp::Sub)
            }
            ast::Expr::Unary(op, operand) => {
                let op = match op {
                    ast::UnaryOp::Complement => UnaryOp::Complement,
                    ast::UnaryOp::Negate => UnaryOp::Negate,
                    ast::UnaryOp::Not => UnaryOp::Not,
                    _ => unreachable!("handled above"),
                };
                let src = self.expr(operand);
                let dst = self.make_temp();
                self.emit(Instruction::Unary {
                    op,
                    src,
                    dst: dst.clone(),
                });
                dst
            }
            ast::Expr::Postfix(op, operand) => {
                let delta = match op {
                    ast::PostfixOp::Inc => BinaryOp::Add,
                    ast::PostfixOp::Dec => BinaryOp::Sub,
                };
                let var = self.expr(operand);
                let old = self.make_temp();
                self.emit(Instruction::Copy {
                    src: var.clone(),
                    dst: old.clone(),
                });
                self.emit(Instruction::Binary {
                    op: delta,
                    src1: var.clone(),
                    src2: Value::Constant(1),
                    dst: var,
                });
                old
            }
            ast::Expr::Binary(ast::BinaryOp::And, lhs, rhs) => self.and_expr(lhs, rhs),
            ast::Expr::Binary(ast::BinaryOp::Or, lhs, rhs) => self.or_expr(lhs, rhs),
            ast::Expr::Binary(op, lhs, rhs) => {
                let op = binary_op(*op);
                let src1 = self.expr(lhs);
                let src2 = self.expr(rhs);
                let dst = self.make_temp();
                self.emit(Instruction::Binary {
                    op,
                    src1,
                    src2,
                    dst: dst.clone(),
                });
                dst
            }
            ast::Expr::Assignment { op, lhs, rhs } => {
                let target = match lhs.as_ref() {
                    ast::Expr::Var(name) => Value::Var(name.clone()),
                    _ => unreachable!("assignment target verified by semantic pass"),
                };
                let value = self.expr(rhs);
                match op {
                    // Plain assignment: copy the right-hand side in.
                    None => self.emit(Instruction::Copy {
                        src: value,
                        dst: target.clone(),
                    }),
                    // Compound assignment expands to `a = a op b`.
                    Some(op) => self.emit(Instruction::Binary {
                        op: binary_op(*op),
                        src1: target.clone(),
                        src2: value,
                        dst: target.clone(),
                    }),
                }
                target
            }
            ast::Expr::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let else_label = self.make_label("cond_else");
                let end_label = self.make_label("cond_end");
                let result = self.make_temp();

                let cond = self.expr(cond);
                self.emit(Instruction::JumpIfZero {
                    cond,
                    target: else_label.clone(),
                });
                let then_value = self.expr(then_expr);
                self.emit(Instruction::Copy {
                    src: then_value,
                    dst: result.clone(),
                });
                self.emit(Instruction::Jump(end_label.clone()));
                self.emit(Instruction::Label(else_label));
                let else_value = self.expr(else_expr);
                self.emit(Instruction::Copy {
                    src: else_value,
                    dst: result.clone(),
                });
                self.emit(Instruction::Label(end_label));
                result
            }
            ast::Expr::FunctionCall { .. } => {
                unreachable!("calls are rejected by semantic analysis")
            }
        }
    }

    /// `++e` / `--e`: adjust in place, the result is the variable itself.
    fn prefix_incdec(&mut self, operand: &ast::Expr, delta: BinaryOp) -> Value {
        let var = self.expr(operand);
        self.emit(Instruction::Binary {
            op: delta,
            src1: var.clone(),
            src2: Value::Constant(1),
            dst: var.clone(),
        });
        var
    }

    /// `lhs && rhs` with short-circuit control flow.
    fn and_expr(&mut self, lhs: &ast::Expr, rhs: &ast::Expr) -> Value {
        let false_label = self.make_label("and_false");
        let end_label = self.make_label("and_end");
        let result = self.make_temp();

        let lhs = self.expr(lhs);
        self.emit(Instruction::JumpIfZero {
            cond: lhs,
            target: false_label.clone(),
        });
        let rhs = self.expr(rhs);
        self.emit(Instruction::JumpIfZero {
            cond: rhs,
            target: false_label.clone(),
        });
        self.emit(Instruction::Copy {
            src: Value::Constant(1),
            dst: result.clone(),
        });
        self.emit(Instruction::Jump(end_label.clone()));
        self.emit(Instruction::Label(false_label));
        self.emit(Instruction::Copy {
            src: Value::Constant(0),
            dst: result.clone(),
        });
        self.emit(Instruction::Label(end_label));
        result
    }

    /// `lhs || rhs`: symmetric to `&&` with the constants swapped.
    fn or_expr(&mut self, lhs: &ast::Expr, rhs: &ast::Expr) -> Value {
        let true_label = self.make_label("or_true");
        let end_label = self.make_label("or_end");
        let result = self.make_temp();

        let lhs = self.expr(lhs);
        self.emit(Instruction::JumpIfNotZero {
            cond: lhs,
            target: true_label.clone(),
        });
        let rhs = self.expr(rhs);
        self.emit(Instruction::JumpIfNotZero {
            cond: rhs,
            target: true_label.clone(),
        });
        self.emit(Instruction::Copy {
            src: Value::Constant(0),
            dst: result.clone(),
        });
        self.emit(Instruction::Jump(end_label.clone()));
        self.emit(Instruction::Label(true_label));
        self.emit(Instruction::Copy {
            src: Value::Constant(1),
            dst: result.clone(),
        });
        self.emit(Instruction::Label(end_label));
        result
    }
}

/// Maps an AST binary operator (other than `&&`/`||`) to its IR operator.
fn binary_op(op: ast::BinaryOp) -> BinaryOp {
    match op {
        ast::BinaryOp::Add => BinaryOp::Add,
        ast::BinaryOp::Sub => BinaryOp::Sub,
        ast::BinaryOp::Mul => BinaryOp::Mul,
        ast::BinaryOp::Div => BinaryOp::Div,
        ast::BinaryOp::Rem => BinaryOp::Rem,
        ast::BinaryOp::BitAnd => BinaryOp::BitAnd,
        ast::BinaryOp::BitOr => BinaryOp::BitOr,
        ast::BinaryOp::BitXor => BinaryOp::BitXor,
        ast::BinaryOp::Shl => BinaryOp::Shl,
        ast::BinaryOp::Shr => BinaryOp::Shr,
        ast::BinaryOp::Eq => BinaryOp::Eq,
        ast::BinaryOp::Ne => BinaryOp::Ne,
        ast::BinaryOp::Lt => BinaryOp::Lt,
        ast::BinaryOp::Le => BinaryOp::Le,
        ast::BinaryOp::Gt => BinaryOp::Gt,
        ast::BinaryOp::Ge => BinaryOp::Ge,
        ast::BinaryOp::And | ast::BinaryOp::Or => {
            unreachable!("short-circuit operators are lowered to control flow")
        }
    }
}

/// Unwraps a label the semantic passes are required to have attached.
fn expect_label(label: &Option<String>) -> &str {
    label
        .as_deref()
        .expect("statement not annotated by loop labeling")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tacky::{Instruction as I, Value as V};
    use mcc_util::{FxHashSet, Handler};

    /// Full front half of the pipeline: lex, parse, semantic passes, lower.
    fn lower(source: &str) -> Function {
        let mut handler = Handler::new();
        let tokens = mcc_lex::Lexer::new(source, &mut handler).tokenize();
        assert!(!handler.has_errors(), "lex errors in test input");
        let mut program = mcc_par::Parser::new(&tokens)
            .parse_program()
            .expect("parse failed");
        mcc_sem::analyze(&mut program).expect("semantic analysis failed");
        lower_program(&program).function
    }

    fn var(name: &str) -> V {
        V::Var(name.to_string())
    }

    // =========================================================================
    // EXPRESSION LOWERING
    // =========================================================================

    #[test]
    fn test_return_constant() {
        let f = lower("int main(void) { return 2; }");
        assert_eq!(f.name, "main");
        assert_eq!(f.instructions, vec![I::Return(V::Constant(2))]);
    }

    #[test]
    fn test_nested_unary() {
        let f = lower("int main(void) { return ~(-3); }");
        assert_eq!(
            f.instructions,
            vec![
                I::Unary {
                    op: UnaryOp::Negate,
                    src: V::Constant(3),
                    dst: var("tmp.0"),
                },
                I::Unary {
                    op: UnaryOp::Complement,
                    src: var("tmp.0"),
                    dst: var("tmp.1"),
                },
                I::Return(var("tmp.1")),
            ]
        );
    }

    #[test]
    fn test_unary_plus_is_noop() {
        let f = lower("int main(void) { return +5; }");
        assert_eq!(f.instructions, vec![I::Return(V::Constant(5))]);
    }

    #[test]
    fn test_binary_left_to_right() {
        let f = lower("int main(void) { return 1 + 2 * 3; }");
        assert_eq!(
            f.instructions,
            vec![
                I::Binary {
                    op: BinaryOp::Mul,
                    src1: V::Constant(2),
                    src2: V::Constant(3),
                    dst: var("tmp.0"),
                },
                I::Binary {
                    op: BinaryOp::Add,
                    src1: V::Constant(1),
                    src2: var("tmp.0"),
                    dst: var("tmp.1"),
                },
                I::Return(var("tmp.1")),
            ]
        );
    }

    #[test]
    fn test_assignment_copies_into_target() {
        let f = lower("int main(void) { int a = 5; a = 7; return a; }");
        let copies: Vec<_> = f
            .instructions
            .iter()
            .filter(|i| matches!(i, I::Copy { .. }))
            .collect();
        assert_eq!(copies.len(), 2);
    }

    #[test]
    fn test_compound_assignment_expands() {
        let f = lower("int main(void) { int a = 5; a += 3; return a; }");
        assert!(f.instructions.iter().any(|i| matches!(
            i,
            I::Binary {
                op: BinaryOp::Add,
                src2: V::Constant(3),
                ..
            }
        )));
    }

    #[test]
    fn test_prefix_increment_returns_variable() {
        let f = lower("int main(void) { int a = 1; return ++a; }");
        // The returned value is the variable itself, not a temp copy.
        let ret = f.instructions.last().unwrap();
        let I::Return(V::Var(name)) = ret else {
            panic!("expected return of a variable");
        };
        assert!(name.starts_with("a."));
    }

    #[test]
    fn test_postfix_increment_returns_old_value() {
        let f = lower("int main(void) { int a = 1; return a++; }");
        // A copy of the old value is taken before the increment.
        let positions: Vec<_> = f
            .instructions
            .iter()
            .enumerate()
            .filter_map(|(i, inst)| match inst {
                I::Copy { dst: V::Var(d), .. } if d.starts_with("tmp.") => Some(i),
                I::Binary {
                    op: BinaryOp::Add, ..
                } => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(positions.len(), 2);
        assert!(positions[0] < positions[1], "copy must precede increment");
        let I::Return(V::Var(returned)) = f.instructions.last().unwrap() else {
            panic!("expected return of a variable");
        };
        assert!(returned.starts_with("tmp."));
    }

    #[test]
    fn test_and_short_circuit_shape() {
        let f = lower("int main(void) { return 1 && 0; }");
        assert_eq!(
            f.instructions,
            vec![
                I::JumpIfZero {
                    cond: V::Constant(1),
                    target: "and_false.0".to_string(),
                },
                I::JumpIfZero {
                    cond: V::Constant(0),
                    target: "and_false.0".to_string(),
                },
                I::Copy {
                    src: V::Constant(1),
                    dst: var("tmp.0"),
                },
                I::Jump("and_end.1".to_string()),
                I::Label("and_false.0".to_string()),
                I::Copy {
                    src: V::Constant(0),
                    dst: var("tmp.0"),
                },
                I::Label("and_end.1".to_string()),
                I::Return(var("tmp.0")),
            ]
        );
    }

    #[test]
    fn test_or_short_circuit_shape() {
        let f = lower("int main(void) { return 0 || 1; }");
        assert_eq!(
            f.instructions,
            vec![
                I::JumpIfNotZero {
                    cond: V::Constant(0),
                    target: "or_true.0".to_string(),
                },
                I::JumpIfNotZero {
                    cond: V::Constant(1),
                    target: "or_true.0".to_string(),
                },
                I::Copy {
                    src: V::Constant(0),
                    dst: var("tmp.0"),
                },
                I::Jump("or_end.1".to_string()),
                I::Label("or_true.0".to_string()),
                I::Copy {
                    src: V::Constant(1),
                    dst: var("tmp.0"),
                },
                I::Label("or_end.1".to_string()),
                I::Return(var("tmp.0")),
            ]
        );
    }

    #[test]
    fn test_conditional_expression() {
        let f = lower("int main(void) { int a = 0; int b = 1; return (a ? 10 : b + 2); }");
        // Both branches copy into the same result temp.
        let copy_dsts: FxHashSet<_> = f
            .instructions
            .iter()
            .filter_map(|i| match i {
                I::Copy { dst: V::Var(d), .. } if d.starts_with("tmp.") => Some(d.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(copy_dsts.len(), 1);
    }

    // =========================================================================
    // STATEMENT LOWERING
    // =========================================================================

    #[test]
    fn test_if_without_else() {
        let f = lower("int main(void) { if (1) return 2; return 3; }");
        assert_eq!(
            f.instructions,
            vec![
                I::JumpIfZero {
                    cond: V::Constant(1),
                    target: "if_end.0".to_string(),
                },
                I::Return(V::Constant(2)),
                I::Label("if_end.0".to_string()),
                I::Return(V::Constant(3)),
            ]
        );
    }

    #[test]
    fn test_if_with_else() {
        let f = lower("int main(void) { if (0) return 1; else return 2; }");
        assert_eq!(
            f.instructions,
            vec![
                I::JumpIfZero {
                    cond: V::Constant(0),
                    target: "if_else.0".to_string(),
                },
                I::Return(V::Constant(1)),
                I::Jump("if_end.1".to_string()),
                I::Label("if_else.0".to_string()),
                I::Return(V::Constant(2)),
                I::Label("if_end.1".to_string()),
                I::Return(V::Constant(0)),
            ]
        );
    }

    #[test]
    fn test_while_loop_shape() {
        let f = lower("int main(void) { while (0) break; return 1; }");
        assert_eq!(
            f.instructions,
            vec![
                I::Label("continue.while.0".to_string()),
                I::JumpIfZero {
                    cond: V::Constant(0),
                    target: "break.while.0".to_string(),
                },
                I::Jump("break.while.0".to_string()),
                I::Jump("continue.while.0".to_string()),
                I::Label("break.while.0".to_string()),
                I::Return(V::Constant(1)),
            ]
        );
    }

    #[test]
    fn test_do_while_tests_after_body() {
        let f = lower("int main(void) { int a = 0; do a = a + 1; while (0); return a; }");
        let label_names: Vec<_> = f
            .instructions
            .iter()
            .filter_map(|i| match i {
                I::Label(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            label_names,
            vec!["start.do.0", "continue.do.0", "break.do.0"]
        );
        // The back-edge is conditional on the test.
        assert!(f.instructions.iter().any(|i| matches!(
            i,
            I::JumpIfNotZero { target, .. } if target == "start.do.0"
        )));
    }

    #[test]
    fn test_for_loop_shape() {
        let f = lower(
            "int main(void) { int s = 0; for (int i = 0; i < 2; i = i + 1) s = s + i; return s; }",
        );
        let label_names: Vec<_> = f
            .instructions
            .iter()
            .filter_map(|i| match i {
                I::Label(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            label_names,
            vec!["start.for.0", "continue.for.0", "break.for.0"]
        );
    }

    #[test]
    fn test_for_without_condition_loops_unconditionally() {
        let f = lower("int main(void) { for (;;) break; return 0; }");
        assert!(!f
            .instructions
            .iter()
            .any(|i| matches!(i, I::JumpIfZero { .. })));
    }

    #[test]
    fn test_continue_targets_post_position() {
        let f = lower(
            "int main(void) { for (int i = 0; i < 3; i = i + 1) continue; return 0; }",
        );
        assert!(f
            .instructions
            .iter()
            .any(|i| matches!(i, I::Jump(t) if t == "continue.for.0")));
    }

    #[test]
    fn test_goto_and_label() {
        let f = lower("int main(void) { goto out; out: return 1; }");
        let I::Jump(target) = &f.instructions[0] else {
            panic!("expected jump");
        };
        assert!(matches!(&f.instructions[1], I::Label(l) if l == target));
    }

    #[test]
    fn test_switch_compare_chain() {
        let f = lower(
            "int main(void) { switch (2) { case 1: return 1; case 2: return 2; } return 9; }",
        );
        // One equality test per case, then a jump past the switch.
        let eq_count = f
            .instructions
            .iter()
            .filter(|i| matches!(i, I::Binary { op: BinaryOp::Eq, .. }))
            .count();
        assert_eq!(eq_count, 2);
        assert!(f
            .instructions
            .iter()
            .any(|i| matches!(i, I::Jump(t) if t == "break.switch.0")));
    }

    #[test]
    fn test_switch_without_match_falls_to_default() {
        let f = lower(
            "int main(void) { switch (9) { case 1: return 1; default: return 7; } return 0; }",
        );
        let jumps: Vec<_> = f
            .instructions
            .iter()
            .filter_map(|i| match i {
                I::Jump(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert!(jumps.contains(&"default.2"));
    }

    // =========================================================================
    // IR INVARIANTS
    // =========================================================================

    /// Every jump target must be defined exactly once, and every variable
    /// read must have been written first (or be a declared source name).
    fn check_invariants(f: &Function) {
        let mut defined_labels = Vec::new();
        for inst in &f.instructions {
            if let I::Label(l) = inst {
                defined_labels.push(l.clone());
            }
        }
        let label_set: FxHashSet<_> = defined_labels.iter().cloned().collect();
        assert_eq!(label_set.len(), defined_labels.len(), "duplicate label");

        let mut written: FxHashSet<String> = FxHashSet::default();
        let read_ok = |value: &V, written: &FxHashSet<String>| {
            if let V::Var(name) = value {
                assert!(
                    written.contains(name) || !name.starts_with("tmp."),
                    "temporary {} read before write",
                    name
                );
            }
        };
        for inst in &f.instructions {
            match inst {
                I::Return(v) => read_ok(v, &written),
                I::Unary { src, dst, .. } => {
                    read_ok(src, &written);
                    if let V::Var(d) = dst {
                        written.insert(d.clone());
                    }
                }
                I::Binary {
                    src1, src2, dst, ..
                } => {
                    read_ok(src1, &written);
                    read_ok(src2, &written);
                    if let V::Var(d) = dst {
                        written.insert(d.clone());
                    }
                }
                I::Copy { src, dst } => {
                    read_ok(src, &written);
                    if let V::Var(d) = dst {
                        written.insert(d.clone());
                    }
                }
                I::Jump(t) | I::JumpIfZero { target: t, .. }
                | I::JumpIfNotZero { target: t, .. } => {
                    assert!(label_set.contains(t), "jump to undefined label {}", t);
                }
                I::Label(_) => {}
            }
        }
    }

    #[test]
    fn test_invariants_hold_across_features() {
        let sources = [
            "int main(void) { return 2; }",
            "int main(void) { return 1 && 0 || 1; }",
            "int main(void) { int a = 5; a += 3; return a; }",
            "int main(void) { int a = 0; int b = 1; return (a ? 10 : b + 2); }",
            "int main(void) { int s = 0; for (int i = 0; i < 9; ++i) { if (i % 2) continue; s += i; } return s; }",
            "int main(void) { switch (3) { case 1: return 1; case 3: ; default: return 5; } }",
            "int main(void) { int a = 1; do { a <<= 2; } while (a < 100); return a; }",
        ];
        for source in sources {
            check_invariants(&lower(source));
        }
    }
}
