//! Codegen error type.
//!
//! Every variant is an internal assertion: valid IR can never trigger one.
//! User-facing errors all surface earlier, in lexing, parsing, or the
//! semantic passes.

use thiserror::Error;

/// An internal codegen invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("internal error: pseudo operand '{0}' survived replacement")]
    UnreplacedPseudo(String),

    #[error("internal error: memory-to-memory {0} survived fix-up")]
    MemoryToMemory(&'static str),

    #[error("internal error: idiv with immediate operand survived fix-up")]
    IdivImmediate,

    #[error("internal error: cmp with immediate destination survived fix-up")]
    CmpImmediateDst,

    #[error("internal error: stack offset {0} is not a negative multiple of 4")]
    MisalignedStackOffset(i32),
}
