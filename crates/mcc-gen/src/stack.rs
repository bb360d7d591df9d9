//! Phase B: pseudo-register replacement.
//!
//! Walks every operand, mapping each distinct pseudo name to the next free
//! 4-byte stack slot (`-4`, `-8`, `-12`, ...). After this pass no
//! [`Operand::Pseudo`] remains; the returned frame size is what the fix-up
//! pass turns into the `AllocateStack` prologue instruction.

use crate::asm::{Function, Instruction, Operand};
use mcc_util::FxHashMap;

/// Replaces every pseudo operand with a stack slot.
///
/// Returns the total frame size in bytes (non-negative).
pub fn replace_pseudos(function: &mut Function) -> i32 {
    let mut replacer = PseudoReplacer::new();
    for instruction in &mut function.instructions {
        replacer.instruction(instruction);
    }
    replacer.frame_size()
}

struct PseudoReplacer {
    offsets: FxHashMap<String, i32>,
    next_offset: i32,
}

impl PseudoReplacer {
    fn new() -> Self {
        Self {
            offsets: FxHashMap::default(),
            next_offset: 0,
        }
    }

    fn frame_size(&self) -> i32 {
        -self.next_offset
    }

    fn instruction(&mut self, instruction: &mut Instruction) {
        match instruction {
            Instruction::Mov { src, dst }
            | Instruction::Binary { src, dst, .. }
            | Instruction::Cmp { src, dst } => {
                self.operand(src);
                self.operand(dst);
            }
            Instruction::Unary { dst, .. } | Instruction::SetCC { dst, .. } => {
                self.operand(dst);
            }
            Instruction::Idiv(operand) => self.operand(operand),
            Instruction::Cdq
            | Instruction::Jmp(_)
            | Instruction::JmpCC { .. }
            | Instruction::Label(_)
            | Instruction::AllocateStack(_)
            | Instruction::Ret => {}
        }
    }

    fn operand(&mut self, operand: &mut Operand) {
        if let Operand::Pseudo(name) = operand {
            let offset = match self.offsets.get(name.as_str()) {
                Some(offset) => *offset,
                None => {
                    self.next_offset -= 4;
                    self.offsets.insert(name.clone(), self.next_offset);
                    self.next_offset
                }
            };
            *operand = Operand::Stack(offset);
        }
    }
}
