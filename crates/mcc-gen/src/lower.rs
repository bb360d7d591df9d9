//! Phase A: IR to assembly instruction selection.
//!
//! Each IR instruction expands to a fixed pattern of machine instructions
//! with pseudo operands standing in for IR variables. No register
//! allocation happens here; pseudo replacement and fix-up run afterwards.
//!
//! Selection patterns:
//!
//! | IR | Assembly |
//! |----|----------|
//! | `Return(v)` | `mov v, %eax; ret` |
//! | `Unary(Neg/Complement)` | `mov src, dst; neg/not dst` |
//! | `Unary(Not)` | `cmp $0, src; mov $0, dst; sete dst` |
//! | `Binary(Add/Sub/Mul/bitwise)` | `mov src1, dst; op src2, dst` |
//! | `Binary(Shl/Shr)` | `mov src1, dst; [mov src2, %ecx;] op count, dst` |
//! | `Binary(Div/Rem)` | `mov src1, %eax; cdq; idiv src2; mov %eax/%edx, dst` |
//! | comparison | `cmp src2, src1; mov $0, dst; setcc dst` |
//! | `JumpIfZero/NotZero` | `cmp $0, v; je/jne target` |

use crate::asm::{BinaryOp, CondCode, Function, Instruction, Operand, Program, Reg, UnaryOp};
use mcc_tacky as tacky;

/// Lowers an IR program to assembly with pseudo operands.
pub fn lower_program(program: &tacky::Program) -> Program {
    Program {
        function: lower_function(&program.function),
    }
}

/// Lowers one IR function.
pub fn lower_function(function: &tacky::Function) -> Function {
    let mut instructions = Vec::new();
    for instruction in &function.instructions {
        lower_instruction(instruction, &mut instructions);
    }
    Function {
        name: function.name.clone(),
        instructions,
    }
}

fn lower_instruction(instruction: &tacky::Instruction, out: &mut Vec<Instruction>) {
    match instruction {
        tacky::Instruction::Return(value) => {
            out.push(Instruction::Mov {
                src: operand(value),
                dst: Operand::Reg(Reg::AX),
            });
            out.push(Instruction::Ret);
        }
        tacky::Instruction::Unary {
            op: tacky::UnaryOp::Not,
            src,
            dst,
        } => {
            // Logical not is a comparison against zero.
            out.push(Instruction::Cmp {
                src: Operand::Imm(0),
                dst: operand(src),
            });
            out.push(Instruction::Mov {
                src: Operand::Imm(0),
                dst: operand(dst),
            });
            out.push(Instruction::SetCC {
                cc: CondCode::E,
                dst: operand(dst),
            });
        }
        tacky::Instruction::Unary { op, src, dst } => {
            let op = match op {
                tacky::UnaryOp::Complement => UnaryOp::Not,
                tacky::UnaryOp::Negate => UnaryOp::Neg,
                tacky::UnaryOp::Not => unreachable!("handled above"),
            };
            out.push(Instruction::Mov {
                src: operand(src),
                dst: operand(dst),
            });
            out.push(Instruction::Unary {
                op,
                dst: operand(dst),
            });
        }
        tacky::Instruction::Binary {
            op,
            src1,
            src2,
            dst,
        } => lower_binary(*op, src1, src2, dst, out),
        tacky::Instruction::Copy { src, dst } => {
            out.push(Instruction::Mov {
                src: operand(src),
                dst: operand(dst),
            });
        }
        tacky::Instruction::Jump(target) => {
            out.push(Instruction::Jmp(target.clone()));
        }
        tacky::Instruction::JumpIfZero { cond, target } => {
            out.push(Instruction::Cmp {
                src: Operand::Imm(0),
                dst: operand(cond),
            });
            out.push(Instruction::JmpCC {
                cc: CondCode::E,
                target: target.clone(),
            });
        }
        tacky::Instruction::JumpIfNotZero { cond, target } => {
            out.push(Instruction::Cmp {
                src: Operand::Imm(0),
                dst: operand(cond),
            });
            out.push(Instruction::JmpCC {
                cc: CondCode::NE,
                target: target.clone(),
            });
        }
        tacky::Instruction::Label(label) => {
            out.push(Instruction::Label(label.clone()));
        }
    }
}

fn lower_binary(
    op: tacky::BinaryOp,
    src1: &tacky::Value,
    src2: &tacky::Value,
    dst: &tacky::Value,
    out: &mut Vec<Instruction>,
) {
    match op {
        tacky::BinaryOp::Div => lower_division(src1, src2, dst, Reg::AX, out),
        tacky::BinaryOp::Rem => lower_division(src1, src2, dst, Reg::DX, out),
        tacky::BinaryOp::Eq => lower_comparison(CondCode::E, src1, src2, dst, out),
        tacky::BinaryOp::Ne => lower_comparison(CondCode::NE, src1, src2, dst, out),
        tacky::BinaryOp::Lt => lower_comparison(CondCode::L, src1, src2, dst, out),
        tacky::BinaryOp::Le => lower_comparison(CondCode::LE, src1, src2, dst, out),
        tacky::BinaryOp::Gt => lower_comparison(CondCode::G, src1, src2, dst, out),
        tacky::BinaryOp::Ge => lower_comparison(CondCode::GE, src1, src2, dst, out),
        tacky::BinaryOp::Shl | tacky::BinaryOp::Shr => {
            let op = if op == tacky::BinaryOp::Shl {
                BinaryOp::Shl
            } else {
                BinaryOp::Sar
            };
            out.push(Instruction::Mov {
                src: operand(src1),
                dst: operand(dst),
            });
            // The shift count must be an immediate or live in %cl.
            let count = match src2 {
                tacky::Value::Constant(c) => Operand::Imm(*c),
                tacky::Value::Var(_) => {
                    out.push(Instruction::Mov {
                        src: operand(src2),
                        dst: Operand::Reg(Reg::CX),
                    });
                    Operand::Reg(Reg::CX)
                }
            };
            out.push(Instruction::Binary {
                op,
                src: count,
                dst: operand(dst),
            });
        }
        _ => {
            let op = match op {
                tacky::BinaryOp::Add => BinaryOp::Add,
                tacky::BinaryOp::Sub => BinaryOp::Sub,
                tacky::BinaryOp::Mul => BinaryOp::Mul,
                tacky::BinaryOp::BitAnd => BinaryOp::And,
                tacky::BinaryOp::BitOr => BinaryOp::Or,
                tacky::BinaryOp::BitXor => BinaryOp::Xor,
                _ => unreachable!("handled above"),
            };
            out.push(Instruction::Mov {
                src: operand(src1),
                dst: operand(dst),
            });
            out.push(Instruction::Binary {
                op,
                src: operand(src2),
                dst: operand(dst),
            });
        }
    }
}

/// `idiv` computes `%edx:%eax / operand`; the quotient lands in `%eax`,
/// the remainder in `%edx`.
fn lower_division(
    src1: &tacky::Value,
    src2: &tacky::Value,
    dst: &tacky::Value,
    result_reg: Reg,
    out: &mut Vec<Instruction>,
) {
    out.push(Instruction::Mov {
        src: operand(src1),
        dst: Operand::Reg(Reg::AX),
    });
    out.push(Instruction::Cdq);
    out.push(Instruction::Idiv(operand(src2)));
    out.push(Instruction::Mov {
        src: Operand::Reg(result_reg),
        dst: operand(dst),
    });
}

fn lower_comparison(
    cc: CondCode,
    src1: &tacky::Value,
    src2: &tacky::Value,
    dst: &tacky::Value,
    out: &mut Vec<Instruction>,
) {
    // cmpl sets flags from dst - src, so src2 goes in the src slot.
    out.push(Instruction::Cmp {
        src: operand(src2),
        dst: operand(src1),
    });
    out.push(Instruction::Mov {
        src: Operand::Imm(0),
        dst: operand(dst),
    });
    out.push(Instruction::SetCC {
        cc,
        dst: operand(dst),
    });
}

/// IR constants become immediates; IR variables become pseudo operands.
fn operand(value: &tacky::Value) -> Operand {
    match value {
        tacky::Value::Constant(v) => Operand::Imm(*v),
        tacky::Value::Var(name) => Operand::Pseudo(name.clone()),
    }
}
