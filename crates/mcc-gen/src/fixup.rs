//! Phase C: instruction fix-up.
//!
//! After pseudo replacement most operands are stack slots, and several
//! resulting instructions violate x86-64 addressing rules. This pass
//! prepends the frame allocation and rewrites the offending forms through
//! the scratch registers:
//!
//! - `mov mem, mem` splits through `%r10d`;
//! - `idiv $imm` loads the immediate into `%r10d` first;
//! - `imul _, mem` keeps its destination in `%r11d` and stores back;
//! - two-memory `add`/`sub`/`and`/`or`/`xor` route the source via `%r10d`;
//! - `cmp mem, mem` routes the source via `%r10d`;
//! - `cmp _, $imm` loads the immediate destination into `%r11d`.
//!
//! [`verify`] re-checks the invariants afterwards; a violation is a
//! compiler bug, not a user error.

use crate::asm::{BinaryOp, Function, Instruction, Operand, Reg};
use crate::error::CodegenError;

/// Rounds the frame up to the 16-byte alignment the ABI expects at calls.
fn round_frame(frame_size: i32) -> i32 {
    (frame_size + 15) & !15
}

/// Prepends the stack allocation and repairs illegal operand combinations.
pub fn fix_instructions(function: &mut Function, frame_size: i32) {
    let old = std::mem::take(&mut function.instructions);
    let mut fixed = Vec::with_capacity(old.len() + 1);
    fixed.push(Instruction::AllocateStack(round_frame(frame_size)));

    for instruction in old {
        match instruction {
            Instruction::Mov { src, dst } if src.is_memory() && dst.is_memory() => {
                fixed.push(Instruction::Mov {
                    src,
                    dst: Operand::Reg(Reg::R10),
                });
                fixed.push(Instruction::Mov {
                    src: Operand::Reg(Reg::R10),
                    dst,
                });
            }
            Instruction::Idiv(Operand::Imm(value)) => {
                fixed.push(Instruction::Mov {
                    src: Operand::Imm(value),
                    dst: Operand::Reg(Reg::R10),
                });
                fixed.push(Instruction::Idiv(Operand::Reg(Reg::R10)));
            }
            // imul cannot write to memory: compute in %r11d, store back.
            Instruction::Binary {
                op: BinaryOp::Mul,
                src,
                dst,
            } if dst.is_memory() => {
                fixed.push(Instruction::Mov {
                    src: dst.clone(),
                    dst: Operand::Reg(Reg::R11),
                });
                fixed.push(Instruction::Binary {
                    op: BinaryOp::Mul,
                    src,
                    dst: Operand::Reg(Reg::R11),
                });
                fixed.push(Instruction::Mov {
                    src: Operand::Reg(Reg::R11),
                    dst,
                });
            }
            Instruction::Binary { op, src, dst }
                if !op.is_shift() && src.is_memory() && dst.is_memory() =>
            {
                fixed.push(Instruction::Mov {
                    src,
                    dst: Operand::Reg(Reg::R10),
                });
                fixed.push(Instruction::Binary {
                    op,
                    src: Operand::Reg(Reg::R10),
                    dst,
                });
            }
            Instruction::Cmp { src, dst } if src.is_memory() && dst.is_memory() => {
                fixed.push(Instruction::Mov {
                    src,
                    dst: Operand::Reg(Reg::R10),
                });
                fixed.push(Instruction::Cmp {
                    src: Operand::Reg(Reg::R10),
                    dst,
                });
            }
            Instruction::Cmp {
                src,
                dst: Operand::Imm(value),
            } => {
                fixed.push(Instruction::Mov {
                    src: Operand::Imm(value),
                    dst: Operand::Reg(Reg::R11),
                });
                fixed.push(Instruction::Cmp {
                    src,
                    dst: Operand::Reg(Reg::R11),
                });
            }
            other => fixed.push(other),
        }
    }

    function.instructions = fixed;
}

/// Checks the post-fix-up invariants.
pub fn verify(function: &Function) -> Result<(), CodegenError> {
    for instruction in &function.instructions {
        let operands: Vec<&Operand> = match instruction {
            Instruction::Mov { src, dst }
            | Instruction::Binary { src, dst, .. }
            | Instruction::Cmp { src, dst } => vec![src, dst],
            Instruction::Unary { dst, .. } | Instruction::SetCC { dst, .. } => vec![dst],
            Instruction::Idiv(operand) => vec![operand],
            _ => vec![],
        };
        for operand in &operands {
            match operand {
                Operand::Pseudo(name) => {
                    return Err(CodegenError::UnreplacedPseudo(name.clone()));
                }
                Operand::Stack(offset) if *offset >= 0 || offset % 4 != 0 => {
                    return Err(CodegenError::MisalignedStackOffset(*offset));
                }
                _ => {}
            }
        }
        match instruction {
            Instruction::Mov { src, dst } if src.is_memory() && dst.is_memory() => {
                return Err(CodegenError::MemoryToMemory("mov"));
            }
            Instruction::Binary { op, src, dst }
                if !op.is_shift() && src.is_memory() && dst.is_memory() =>
            {
                return Err(CodegenError::MemoryToMemory("binary op"));
            }
            Instruction::Cmp { src, dst } if src.is_memory() && dst.is_memory() => {
                return Err(CodegenError::MemoryToMemory("cmp"));
            }
            Instruction::Cmp {
                dst: Operand::Imm(_),
                ..
            } => {
                return Err(CodegenError::CmpImmediateDst);
            }
            Instruction::Idiv(Operand::Imm(_)) => {
                return Err(CodegenError::IdivImmediate);
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(instructions: Vec<Instruction>) -> Function {
        Function {
            name: "main".to_string(),
            instructions,
        }
    }

    #[test]
    fn test_frame_allocation_is_prepended_and_rounded() {
        let mut f = function(vec![Instruction::Ret]);
        fix_instructions(&mut f, 12);
        assert_eq!(f.instructions[0], Instruction::AllocateStack(16));

        let mut f = function(vec![Instruction::Ret]);
        fix_instructions(&mut f, 16);
        assert_eq!(f.instructions[0], Instruction::AllocateStack(16));

        let mut f = function(vec![Instruction::Ret]);
        fix_instructions(&mut f, 0);
        assert_eq!(f.instructions[0], Instruction::AllocateStack(0));
    }

    #[test]
    fn test_memory_to_memory_mov_splits() {
        let mut f = function(vec![Instruction::Mov {
            src: Operand::Stack(-4),
            dst: Operand::Stack(-8),
        }]);
        fix_instructions(&mut f, 8);
        assert_eq!(
            f.instructions[1..],
            [
                Instruction::Mov {
                    src: Operand::Stack(-4),
                    dst: Operand::Reg(Reg::R10),
                },
                Instruction::Mov {
                    src: Operand::Reg(Reg::R10),
                    dst: Operand::Stack(-8),
                },
            ]
        );
    }

    #[test]
    fn test_idiv_immediate_goes_through_r10() {
        let mut f = function(vec![Instruction::Idiv(Operand::Imm(3))]);
        fix_instructions(&mut f, 0);
        assert_eq!(
            f.instructions[1..],
            [
                Instruction::Mov {
                    src: Operand::Imm(3),
                    dst: Operand::Reg(Reg::R10),
                },
                Instruction::Idiv(Operand::Reg(Reg::R10)),
            ]
        );
    }

    #[test]
    fn test_imul_memory_destination_goes_through_r11() {
        let mut f = function(vec![Instruction::Binary {
            op: BinaryOp::Mul,
            src: Operand::Imm(3),
            dst: Operand::Stack(-4),
        }]);
        fix_instructions(&mut f, 4);
        assert_eq!(
            f.instructions[1..],
            [
                Instruction::Mov {
                    src: Operand::Stack(-4),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Binary {
                    op: BinaryOp::Mul,
                    src: Operand::Imm(3),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Mov {
                    src: Operand::Reg(Reg::R11),
                    dst: Operand::Stack(-4),
                },
            ]
        );
    }

    #[test]
    fn test_two_memory_add_routes_source() {
        let mut f = function(vec![Instruction::Binary {
            op: BinaryOp::Add,
            src: Operand::Stack(-4),
            dst: Operand::Stack(-8),
        }]);
        fix_instructions(&mut f, 8);
        assert_eq!(
            f.instructions[1..],
            [
                Instruction::Mov {
                    src: Operand::Stack(-4),
                    dst: Operand::Reg(Reg::R10),
                },
                Instruction::Binary {
                    op: BinaryOp::Add,
                    src: Operand::Reg(Reg::R10),
                    dst: Operand::Stack(-8),
                },
            ]
        );
    }

    #[test]
    fn test_cmp_immediate_destination_loads_r11() {
        let mut f = function(vec![Instruction::Cmp {
            src: Operand::Imm(0),
            dst: Operand::Imm(1),
        }]);
        fix_instructions(&mut f, 0);
        assert_eq!(
            f.instructions[1..],
            [
                Instruction::Mov {
                    src: Operand::Imm(1),
                    dst: Operand::Reg(Reg::R11),
                },
                Instruction::Cmp {
                    src: Operand::Imm(0),
                    dst: Operand::Reg(Reg::R11),
                },
            ]
        );
    }

    #[test]
    fn test_shift_by_cl_on_memory_is_legal() {
        let mut f = function(vec![Instruction::Binary {
            op: BinaryOp::Shl,
            src: Operand::Reg(Reg::CX),
            dst: Operand::Stack(-4),
        }]);
        fix_instructions(&mut f, 4);
        assert_eq!(
            f.instructions[1..],
            [Instruction::Binary {
                op: BinaryOp::Shl,
                src: Operand::Reg(Reg::CX),
                dst: Operand::Stack(-4),
            }]
        );
    }

    #[test]
    fn test_verify_accepts_fixed_output() {
        let mut f = function(vec![
            Instruction::Mov {
                src: Operand::Stack(-4),
                dst: Operand::Stack(-8),
            },
            Instruction::Idiv(Operand::Imm(3)),
            Instruction::Cmp {
                src: Operand::Imm(2),
                dst: Operand::Imm(5),
            },
        ]);
        fix_instructions(&mut f, 8);
        assert!(verify(&f).is_ok());
    }

    #[test]
    fn test_verify_rejects_surviving_pseudo() {
        let f = function(vec![Instruction::Mov {
            src: Operand::Pseudo("tmp.0".to_string()),
            dst: Operand::Reg(Reg::AX),
        }]);
        assert_eq!(
            verify(&f),
            Err(CodegenError::UnreplacedPseudo("tmp.0".to_string()))
        );
    }

    #[test]
    fn test_verify_rejects_misaligned_offset() {
        let f = function(vec![Instruction::Mov {
            src: Operand::Stack(-6),
            dst: Operand::Reg(Reg::AX),
        }]);
        assert_eq!(verify(&f), Err(CodegenError::MisalignedStackOffset(-6)));
    }
}
