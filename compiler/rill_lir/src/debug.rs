//! Debug helpers: control-flow-graph dumps

use crate::block::BlockId;
use crate::function::Function;
use crate::value::ValueKind;
use std::io::{self, Write};

impl Function {
    /// Writes the function's control-flow graph in Graphviz dot form, one
    /// node per block and one edge per branch target. Works on prepared and
    /// unprepared functions alike (unprepared blocks show their index).
    pub fn write_cfg_dot<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "digraph \"{}\" {{", self.name())?;
        for index in 0..self.block_count() {
            let block = BlockId(index);
            writeln!(w, "  b{} [shape=box, label=\"{}\"];", index, self.block_name(block))?;
            for &value in &self.block(block).instrs {
                match self.value_kind(value) {
                    ValueKind::Branch { target } => {
                        writeln!(w, "  b{} -> b{};", index, target.0)?;
                    }
                    ValueKind::BranchIf { if_true, if_false, .. } => {
                        writeln!(w, "  b{} -> b{} [label=\"true\"];", index, if_true.0)?;
                        writeln!(w, "  b{} -> b{} [label=\"false\"];", index, if_false.0)?;
                    }
                    _ => {}
                }
            }
        }
        writeln!(w, "}}")
    }
}
