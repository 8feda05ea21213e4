//! AST to LIR lowering for the Rill compiler
//!
//! Consumes the `rill_syntax` AST and drives the `rill_lir` builder API.
//! Variable writes become register assignments and variable reads become
//! register references; the IR layer takes care of SSA form, so nothing in
//! this crate ever constructs a phi node.

pub mod lower;
pub mod types;

pub use lower::compile;
pub use types::{FuncSig, Ty};
