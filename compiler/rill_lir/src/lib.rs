//! SSA intermediate representation builder for the Rill compiler
//!
//! This crate is the target of the lowering pass: an in-memory model of LIR
//! modules, functions, basic blocks, typed values and instructions, together
//! with the machinery that turns them into textual LIR.
//!
//! The construction API is deliberately forgiving about SSA form. A front-end
//! records variable writes with [`Builder::assign`] and variable reads with
//! [`Builder::ref_var`]; it never builds phi nodes. Emission happens in two
//! phases: `prepare` assigns every instruction its `%n` temporary and every
//! block its label, resolving variable references through predecessor chains
//! and synthesising phi nodes at join points, and only then is any text
//! written. Forward references therefore cost nothing.

pub mod block;
pub mod builder;
pub mod context;
pub mod debug;
pub mod error;
pub mod function;
pub mod module;
pub mod types;
pub mod value;

pub use block::BlockId;
pub use builder::Builder;
pub use context::{Context, ModuleId};
pub use error::LirError;
pub use function::{FuncId, Function};
pub use module::Module;
pub use types::{FuncType, Type};
pub use value::{IntPredicate, Opcode, Register, SymRef, ValueId};
