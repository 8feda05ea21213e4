//! The LIR value model
//!
//! Every instruction is a value; values live in a per-function arena and are
//! referred to by [`ValueId`]. A value carries its result type and, once the
//! prepare phase has run, the ordinal of its `%n` temporary. Constants,
//! parameters and symbol references override the `%n` naming.

use crate::block::BlockId;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Index of a value in its function's arena. Identity of the value: the
/// dedup set and all operand references are in terms of `ValueId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub(crate) usize);

/// An opaque identity for a named source-language variable.
///
/// The IR never interprets the contents; registers are only used as keys in
/// per-block variable tables. The scope ordinal keeps shadowed names
/// distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    name: String,
    scope: u32,
}

impl Register {
    pub fn new(name: impl Into<String>, scope: u32) -> Self {
        Self { name: name.into(), scope }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.scope)
    }
}

/// A reference to a module-level symbol: an external declaration or an
/// interned string. Usable as a call target (by name and type) or
/// materialised into a function with [`crate::Builder::symbol`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymRef {
    name: String,
    ty: Type,
}

impl SymRef {
    pub(crate) fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }

    /// The literal global name, e.g. `@printf`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// Integer comparison predicates accepted by `icmp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    /// Signed less-than.
    Slt,
    /// Signed greater-than.
    Sgt,
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntPredicate::Slt => write!(f, "slt"),
            IntPredicate::Sgt => write!(f, "sgt"),
        }
    }
}

/// Binary opcodes. `ICmp` carries its predicate and produces `i1`; the
/// arithmetic opcodes produce their left operand's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    ICmp(IntPredicate),
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Add => write!(f, "add"),
            Opcode::Sub => write!(f, "sub"),
            Opcode::Mul => write!(f, "mul"),
            Opcode::SDiv => write!(f, "sdiv"),
            Opcode::SRem => write!(f, "srem"),
            Opcode::ICmp(pred) => write!(f, "icmp {}", pred),
        }
    }
}

/// One phi incoming entry: the value's textual name and the predecessor's
/// label, both captured at prepare time.
pub(crate) type PhiIncoming = SmallVec<[(String, String); 2]>;

/// The instruction/value variants.
#[derive(Debug, Clone)]
pub(crate) enum ValueKind {
    /// A literal; its name is the literal text, nothing is emitted.
    Const { text: String },
    /// A module-level symbol; its name is the global id, nothing is emitted.
    SymRef { name: String },
    /// A function parameter, named by one of the first N temporaries.
    Param { index: usize },
    Binop { op: Opcode, lhs: ValueId, rhs: ValueId },
    /// A read of a named variable. Preparation replaces it with either an
    /// existing binding or a synthesised phi; it emits no text of its own.
    Ref { reg: Register, resolved: Option<ValueId> },
    /// A synthesised join of a variable's values across predecessors.
    Phi { reg: Register, incoming: PhiIncoming },
    Call { callee: String, args: Vec<ValueId> },
    Gep { base: ValueId, indices: SmallVec<[i64; 4]> },
    Branch { target: BlockId },
    BranchIf { cond: ValueId, if_true: BlockId, if_false: BlockId },
    Return { value: Option<ValueId> },
}

impl ValueKind {
    pub(crate) fn is_terminator(&self) -> bool {
        matches!(
            self,
            ValueKind::Branch { .. } | ValueKind::BranchIf { .. } | ValueKind::Return { .. }
        )
    }
}

/// Arena slot: variant, result type, and the temporary ordinal assigned
/// during the prepare phase.
#[derive(Debug, Clone)]
pub(crate) struct ValueData {
    pub kind: ValueKind,
    pub ty: Type,
    pub res: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_text() {
        assert_eq!(Opcode::Add.to_string(), "add");
        assert_eq!(Opcode::SDiv.to_string(), "sdiv");
        assert_eq!(Opcode::ICmp(IntPredicate::Slt).to_string(), "icmp slt");
        assert_eq!(Opcode::ICmp(IntPredicate::Sgt).to_string(), "icmp sgt");
    }

    #[test]
    fn registers_compare_by_name_and_scope() {
        let a0 = Register::new("a", 0);
        let a1 = Register::new("a", 1);
        assert_eq!(a0, Register::new("a", 0));
        assert_ne!(a0, a1);
    }

    #[test]
    fn terminators() {
        assert!(ValueKind::Return { value: None }.is_terminator());
        assert!(ValueKind::Branch { target: BlockId(0) }.is_terminator());
        assert!(!ValueKind::Const { text: "0".into() }.is_terminator());
    }
}
