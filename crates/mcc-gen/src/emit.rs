//! Assembly text emission.
//!
//! Renders the fixed-up assembly tree as GNU-assembler AT&T syntax for
//! x86-64. Operations are 32-bit (`l` suffix) except the frame pointer
//! bookkeeping in the prologue and epilogue. Local jump labels get a `.L`
//! prefix so they stay out of the object's symbol table, and the output
//! ends with the `.note.GNU-stack` marker.

use crate::asm::{BinaryOp, CondCode, Function, Instruction, Operand, Program, Reg, UnaryOp};
use std::fmt::Write;

/// Renders a program to assembly text.
pub fn emit_program(program: &Program) -> String {
    let mut out = String::new();
    emit_function(&program.function, &mut out);
    out.push_str("\t.section .note.GNU-stack,\"\",@progbits\n");
    out
}

fn emit_function(function: &Function, out: &mut String) {
    let _ = writeln!(out, "\t.globl {}", function.name);
    let _ = writeln!(out, "{}:", function.name);
    // Prologue: save the caller's frame pointer and establish our own.
    out.push_str("\tpushq %rbp\n");
    out.push_str("\tmovq %rsp, %rbp\n");
    for instruction in &function.instructions {
        emit_instruction(instruction, out);
    }
}

fn emit_instruction(instruction: &Instruction, out: &mut String) {
    match instruction {
        Instruction::Mov { src, dst } => {
            let _ = writeln!(out, "\tmovl {}, {}", operand(src), operand(dst));
        }
        Instruction::Unary { op, dst } => {
            let mnemonic = match op {
                UnaryOp::Neg => "negl",
                UnaryOp::Not => "notl",
            };
            let _ = writeln!(out, "\t{} {}", mnemonic, operand(dst));
        }
        Instruction::Binary { op, src, dst } => {
            let mnemonic = match op {
                BinaryOp::Add => "addl",
                BinaryOp::Sub => "subl",
                BinaryOp::Mul => "imull",
                BinaryOp::And => "andl",
                BinaryOp::Or => "orl",
                BinaryOp::Xor => "xorl",
                BinaryOp::Shl => "sall",
                BinaryOp::Sar => "sarl",
            };
            // A register shift count is written as %cl.
            let src_text = if op.is_shift() {
                match src {
                    Operand::Reg(reg) => byte_register(*reg).to_string(),
                    other => operand(other),
                }
            } else {
                operand(src)
            };
            let _ = writeln!(out, "\t{} {}, {}", mnemonic, src_text, operand(dst));
        }
        Instruction::Cmp { src, dst } => {
            let _ = writeln!(out, "\tcmpl {}, {}", operand(src), operand(dst));
        }
        Instruction::Idiv(divisor) => {
            let _ = writeln!(out, "\tidivl {}", operand(divisor));
        }
        Instruction::Cdq => out.push_str("\tcdq\n"),
        Instruction::Jmp(target) => {
            let _ = writeln!(out, "\tjmp .L{}", target);
        }
        Instruction::JmpCC { cc, target } => {
            let _ = writeln!(out, "\tj{} .L{}", cond_suffix(*cc), target);
        }
        Instruction::SetCC { cc, dst } => {
            // setcc writes one byte; registers need their 8-bit names.
            let dst_text = match dst {
                Operand::Reg(reg) => byte_register(*reg).to_string(),
                other => operand(other),
            };
            let _ = writeln!(out, "\tset{} {}", cond_suffix(*cc), dst_text);
        }
        Instruction::Label(label) => {
            let _ = writeln!(out, ".L{}:", label);
        }
        Instruction::AllocateStack(size) => {
            if *size > 0 {
                let _ = writeln!(out, "\tsubq ${}, %rsp", size);
            }
        }
        Instruction::Ret => {
            out.push_str("\tmovq %rbp, %rsp\n");
            out.push_str("\tpopq %rbp\n");
            out.push_str("\tret\n");
        }
    }
}

fn operand(operand: &Operand) -> String {
    match operand {
        Operand::Imm(value) => format!("${}", value),
        Operand::Reg(reg) => dword_register(*reg).to_string(),
        Operand::Stack(offset) => format!("{}(%rbp)", offset),
        Operand::Pseudo(name) => {
            // Emission after verify() never sees a pseudo; keep the name
            // visible if a debug path prints an unfixed tree.
            format!("%pseudo.{}", name)
        }
    }
}

fn dword_register(reg: Reg) -> &'static str {
    match reg {
        Reg::AX => "%eax",
        Reg::CX => "%ecx",
        Reg::DX => "%edx",
        Reg::R10 => "%r10d",
        Reg::R11 => "%r11d",
    }
}

fn byte_register(reg: Reg) -> &'static str {
    match reg {
        Reg::AX => "%al",
        Reg::CX => "%cl",
        Reg::DX => "%dl",
        Reg::R10 => "%r10b",
        Reg::R11 => "%r11b",
    }
}

fn cond_suffix(cc: CondCode) -> &'static str {
    match cc {
        CondCode::E => "e",
        CondCode::NE => "ne",
        CondCode::L => "l",
        CondCode::LE => "le",
        CondCode::G => "g",
        CondCode::GE => "ge",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(instructions: Vec<Instruction>) -> Program {
        Program {
            function: Function {
                name: "main".to_string(),
                instructions,
            },
        }
    }

    #[test]
    fn test_minimal_function_layout() {
        let text = emit_program(&program(vec![
            Instruction::AllocateStack(0),
            Instruction::Mov {
                src: Operand::Imm(2),
                dst: Operand::Reg(Reg::AX),
            },
            Instruction::Ret,
        ]));
        let expected = "\t.globl main\n\
                        main:\n\
                        \tpushq %rbp\n\
                        \tmovq %rsp, %rbp\n\
                        \tmovl $2, %eax\n\
                        \tmovq %rbp, %rsp\n\
                        \tpopq %rbp\n\
                        \tret\n\
                        \t.section .note.GNU-stack,\"\",@progbits\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_stack_allocation_emitted_when_nonzero() {
        let text = emit_program(&program(vec![Instruction::AllocateStack(16)]));
        assert!(text.contains("\tsubq $16, %rsp\n"));
    }

    #[test]
    fn test_stack_operands_and_unary() {
        let text = emit_program(&program(vec![
            Instruction::Mov {
                src: Operand::Imm(3),
                dst: Operand::Stack(-4),
            },
            Instruction::Unary {
                op: UnaryOp::Neg,
                dst: Operand::Stack(-4),
            },
        ]));
        assert!(text.contains("\tmovl $3, -4(%rbp)\n"));
        assert!(text.contains("\tnegl -4(%rbp)\n"));
    }

    #[test]
    fn test_labels_and_jumps_use_local_prefix() {
        let text = emit_program(&program(vec![
            Instruction::Label("if_end.0".to_string()),
            Instruction::Jmp("if_end.0".to_string()),
            Instruction::JmpCC {
                cc: CondCode::NE,
                target: "start.do.0".to_string(),
            },
        ]));
        assert!(text.contains(".Lif_end.0:\n"));
        assert!(text.contains("\tjmp .Lif_end.0\n"));
        assert!(text.contains("\tjne .Lstart.do.0\n"));
    }

    #[test]
    fn test_setcc_uses_byte_register() {
        let text = emit_program(&program(vec![Instruction::SetCC {
            cc: CondCode::L,
            dst: Operand::Reg(Reg::AX),
        }]));
        assert!(text.contains("\tsetl %al\n"));
    }

    #[test]
    fn test_shift_count_register_renders_cl() {
        let text = emit_program(&program(vec![Instruction::Binary {
            op: BinaryOp::Shl,
            src: Operand::Reg(Reg::CX),
            dst: Operand::Stack(-4),
        }]));
        assert!(text.contains("\tsall %cl, -4(%rbp)\n"));
    }

    #[test]
    fn test_division_sequence() {
        let text = emit_program(&program(vec![
            Instruction::Cdq,
            Instruction::Idiv(Operand::Reg(Reg::R10)),
        ]));
        assert!(text.contains("\tcdq\n"));
        assert!(text.contains("\tidivl %r10d\n"));
    }
}
