//! Return validation.
//!
//! Guarantees the function body ends on a `return` path: if the body is
//! empty or its last block item is not a `return` statement, an implicit
//! `return 0;` is appended. IR lowering relies on this to always conclude
//! with a `Return` instruction.

use mcc_par::ast::{BlockItem, Expr, Function, Stmt};

/// Appends `return 0;` unless the body already ends in a return.
pub fn ensure_return(function: &mut Function) {
    let ends_in_return = matches!(
        function.body.last(),
        Some(BlockItem::Statement(Stmt::Return(_)))
    );
    if !ends_in_return {
        function
            .body
            .push(BlockItem::Statement(Stmt::Return(Expr::Constant(0))));
    }
}
