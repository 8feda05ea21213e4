//! Error types for the LIR builder

use rill_common::{CompileError, Stage};
use thiserror::Error;

/// Errors produced while constructing or emitting LIR.
///
/// Warning-class conditions (return-type mismatches, unresolvable variable
/// references, appends to terminated blocks) are reported through the `log`
/// facade instead so a front-end can finish a pass and surface several
/// problems at once.
#[derive(Error, Debug)]
pub enum LirError {
    /// Dereference of a type with no pointee (integers, void, functions).
    #[error("type {0} is not dereferenceable")]
    NonDereferenceable(String),

    /// A literal that does not parse in the requested radix.
    #[error("invalid integer literal {text:?} in base {radix}")]
    InvalidLiteral { text: String, radix: u32 },

    /// Misuse of the builder API, e.g. emitting a context twice.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LirError> for CompileError {
    fn from(err: LirError) -> Self {
        Stage::Emit.error(err.to_string())
    }
}
