//! mcc-util - Shared foundation types for the mcc compiler.
//!
//! This crate holds the pieces every pipeline stage needs: source spans,
//! the diagnostic handler that accumulates errors across a compilation,
//! and the process exit-code taxonomy the driver reports.

pub mod diagnostic;
pub mod exit;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use exit::ExitCode;
pub use span::Span;

// Re-export the hash map/set used for symbol-keyed tables throughout the
// compiler so stage crates agree on one hasher.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
