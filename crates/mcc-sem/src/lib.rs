//! mcc-sem - Semantic analysis for the mcc compiler.
//!
//! Five AST-to-AST passes run between the parser and IR lowering, mutating
//! the tree in place:
//!
//! 1. **Variable resolution** - every `Var` gets a globally unique name.
//! 2. **Lvalue verification** - assignment and `++`/`--` targets must
//!    denote storage locations.
//! 3. **Label resolution** - user labels are uniquified, `goto` targets
//!    resolved.
//! 4. **Loop & switch labeling** - loops and switches get labels,
//!    `break`/`continue` are annotated, switch case tables are collected.
//! 5. **Return validation** - an implicit `return 0;` is appended when the
//!    body does not already end in a return.
//!
//! Each pass accumulates all the errors it can find before reporting; a
//! pass with errors stops the pipeline, since later passes assume its
//! invariants hold.

pub mod labels;
pub mod resolve;
pub mod scope;
pub mod validate;

pub use labels::{LabelResolver, LoopLabeler};
pub use resolve::{LvalueVerifier, VariableResolver};
pub use validate::ensure_return;

use mcc_par::ast::Program;
use thiserror::Error;

/// An error found by one of the semantic passes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("use of undeclared variable '{0}'")]
    UndeclaredVariable(String),

    #[error("redeclaration of variable '{0}'")]
    DuplicateDeclaration(String),

    #[error("expression is not assignable")]
    NotAnLvalue,

    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error("goto to undefined label '{0}'")]
    UndefinedLabel(String),

    #[error("'break' outside of loop or switch")]
    BreakOutside,

    #[error("'continue' outside of loop")]
    ContinueOutside,

    #[error("'case' outside of switch")]
    CaseOutsideSwitch,

    #[error("'default' outside of switch")]
    DefaultOutsideSwitch,

    #[error("duplicate case value {0}")]
    DuplicateCase(i32),

    #[error("multiple 'default' labels in one switch")]
    DuplicateDefault,

    #[error("case value is not an integer constant")]
    NonConstantCase,

    #[error("call to undefined function '{0}'")]
    UndefinedFunction(String),
}

/// Runs all semantic passes over a program.
///
/// On success the AST satisfies every invariant IR lowering relies on:
/// unique variable and label names, annotated loops and switches, and a
/// body ending in `return`.
pub fn analyze(program: &mut Program) -> Result<(), Vec<SemanticError>> {
    let function = &mut program.function;

    let errors = VariableResolver::new().run(function);
    if !errors.is_empty() {
        return Err(errors);
    }

    let errors = LvalueVerifier::new().run(function);
    if !errors.is_empty() {
        return Err(errors);
    }

    let errors = LabelResolver::new().run(function);
    if !errors.is_empty() {
        return Err(errors);
    }

    let errors = LoopLabeler::new().run(function);
    if !errors.is_empty() {
        return Err(errors);
    }

    ensure_return(function);
    Ok(())
}
