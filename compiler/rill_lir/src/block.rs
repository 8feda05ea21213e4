//! Basic block data
//!
//! A block is an ordered run of values plus the bookkeeping the SSA
//! construction needs: a predecessor list, the per-block variable table, and
//! a buffer of synthesised phis that is prepended to the instruction list
//! when preparation of the block finishes.
//!
//! Blocks live in their function's arena; all operations that need to see
//! sibling blocks or the value arena are methods on [`crate::Function`].

use crate::value::{Register, ValueId};
use hashbrown::HashMap;

/// Index of a block in its function's block list. Predecessor edges and
/// branch targets are stored as `BlockId`s, so the graph has no ownership
/// cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) usize);

#[derive(Debug, Default)]
pub(crate) struct BlockData {
    /// Label ordinal, assigned when the block is prepared.
    pub label: Option<u32>,
    /// Instructions in execution order. After preparation this starts with
    /// the synthesised phis.
    pub instrs: Vec<ValueId>,
    /// Phi buffer; emptied into the front of `instrs` at the end of
    /// preparation.
    pub phis: Vec<ValueId>,
    /// Unique predecessors in insertion order.
    pub preds: Vec<BlockId>,
    /// Most recent assignment to each register within this block.
    pub vars: HashMap<Register, ValueId>,
}

impl BlockData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `source` as a predecessor. Duplicates are dropped; insertion
    /// order is preserved.
    pub fn add_pred(&mut self, source: BlockId) {
        if !self.preds.contains(&source) {
            self.preds.push(source);
        }
    }
}
