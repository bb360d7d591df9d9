//! mcc-gen - Assembly code generation for the mcc compiler.
//!
//! Three phases over the assembly tree, then text emission:
//!
//! - **Phase A** ([`lower`]): IR instruction selection, producing
//!   instructions whose variable operands are pseudo registers.
//! - **Phase B** ([`stack`]): pseudo replacement, mapping every pseudo to
//!   a 4-byte stack slot and computing the frame size.
//! - **Phase C** ([`fixup`]): frame allocation plus rewrites of the
//!   operand combinations x86-64 forbids.
//! - **Emission** ([`emit`]): AT&T-syntax text with prologue/epilogue.
//!
//! [`generate`] runs A-B-C and verifies the invariants; a violation means
//! a compiler bug and surfaces as [`CodegenError`], never as silently
//! wrong assembly.

pub mod asm;
pub mod emit;
pub mod error;
pub mod fixup;
pub mod lower;
pub mod stack;

pub use asm::{Function, Instruction, Operand, Program, Reg};
pub use emit::emit_program;
pub use error::CodegenError;

/// Runs the full codegen pipeline on a lowered IR program.
pub fn generate(program: &mcc_tacky::Program) -> Result<Program, CodegenError> {
    let mut asm = lower::lower_program(program);
    let frame_size = stack::replace_pseudos(&mut asm.function);
    fixup::fix_instructions(&mut asm.function, frame_size);
    fixup::verify(&asm.function)?;
    Ok(asm)
}
