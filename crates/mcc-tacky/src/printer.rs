//! IR text rendering, backing the driver's `--tacky` flag.
//!
//! One instruction per line, indented under the function header:
//!
//! ```text
//! main:
//!     tmp.0 = - 3
//!     tmp.1 = ~ tmp.0
//!     ret tmp.1
//! ```

use crate::tacky::{BinaryOp, Function, Instruction, Program, UnaryOp};
use std::fmt::Write;

/// Renders a lowered program as text.
pub fn print_program(program: &Program) -> String {
    print_function(&program.function)
}

/// Renders one IR function.
pub fn print_function(function: &Function) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", function.name);
    for instruction in &function.instructions {
        match instruction {
            Instruction::Return(value) => {
                let _ = writeln!(out, "    ret {}", value);
            }
            Instruction::Unary { op, src, dst } => {
                let _ = writeln!(out, "    {} = {} {}", dst, unary_symbol(*op), src);
            }
            Instruction::Binary {
                op,
                src1,
                src2,
                dst,
            } => {
                let _ = writeln!(out, "    {} = {} {} {}", dst, src1, binary_symbol(*op), src2);
            }
            Instruction::Copy { src, dst } => {
                let _ = writeln!(out, "    {} = {}", dst, src);
            }
            Instruction::Jump(target) => {
                let _ = writeln!(out, "    jump {}", target);
            }
            Instruction::JumpIfZero { cond, target } => {
                let _ = writeln!(out, "    ifz {} jump {}", cond, target);
            }
            Instruction::JumpIfNotZero { cond, target } => {
                let _ = writeln!(out, "    ifnz {} jump {}", cond, target);
            }
            Instruction::Label(label) => {
                let _ = writeln!(out, "  {}:", label);
            }
        }
    }
    out
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Complement => "~",
        UnaryOp::Negate => "-",
        UnaryOp::Not => "!",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
    }
}
