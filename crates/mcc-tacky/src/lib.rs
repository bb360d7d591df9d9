//! mcc-tacky - Three-address IR and AST lowering.
//!
//! The IR sits between the semantic passes and assembly codegen: a flat
//! instruction sequence per function, with named temporaries and explicit
//! control flow. [`lower_program`] converts a semantically validated AST;
//! [`printer::print_program`] renders the result for `--tacky`.

pub mod lower;
pub mod printer;
pub mod tacky;

pub use lower::{lower_function, lower_program};
pub use printer::print_program;
pub use tacky::{BinaryOp, Function, Instruction, Program, UnaryOp, Value};
