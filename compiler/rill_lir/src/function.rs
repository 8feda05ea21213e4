//! Functions: the value arena and the two-phase emission
//!
//! A function owns its blocks and all of its values. Emission runs in two
//! phases. `prepare` walks the blocks in creation order, assigns each block
//! its label ordinal and each instruction its `%n` temporary, resolves
//! variable references, and synthesises phi nodes at join points. Only after
//! every name is fixed does the textual pass run, so instructions may freely
//! reference blocks and values that appear later in the output.
//!
//! Temporaries and labels draw from disjoint counters, so `%1` and
//! `%label1` never collide.

use crate::block::{BlockData, BlockId};
use crate::types::{FuncType, Type};
use crate::value::{PhiIncoming, Register, ValueData, ValueKind, ValueId};
use hashbrown::HashSet;
use rill_common::Sequence;
use smallvec::SmallVec;
use std::io::{self, Write};

/// Index of a function in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub(crate) usize);

#[derive(Debug)]
pub struct Function {
    name: String,
    ty: FuncType,
    values: Vec<ValueData>,
    blocks: Vec<BlockData>,
    params: Vec<ValueId>,
    /// Values already appended to some block. Adding a value twice is a
    /// no-op, which lets callers pass operands back through `add`
    /// idempotently.
    value_set: HashSet<ValueId>,
    tmps: Sequence,
    labels: Sequence,
}

impl Function {
    /// Builds an empty function. The synthetic parameter block is prepared
    /// immediately: parameters claim the first N temporaries, `%0 … %n-1`.
    pub(crate) fn new(name: impl Into<String>, ty: FuncType) -> Self {
        let mut fun = Self {
            name: name.into(),
            ty,
            values: Vec::new(),
            blocks: Vec::new(),
            params: Vec::new(),
            value_set: HashSet::new(),
            tmps: Sequence::new(),
            labels: Sequence::new(),
        };
        for (index, param_ty) in fun.ty.params.clone().into_iter().enumerate() {
            let res = fun.tmps.next();
            let id = ValueId(fun.values.len());
            fun.values.push(ValueData {
                kind: ValueKind::Param { index },
                ty: param_ty,
                res: Some(res),
            });
            fun.params.push(id);
        }
        fun
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FuncType {
        &self.ty
    }

    /// The i-th parameter's value handle.
    pub fn param(&self, index: usize) -> ValueId {
        self.params[index]
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Allocates a new empty block.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BlockData::new());
        id
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id.0]
    }

    pub(crate) fn push_value(&mut self, kind: ValueKind, ty: Type) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(ValueData { kind, ty, res: None });
        id
    }

    pub fn value_type(&self, value: ValueId) -> &Type {
        &self.values[value.0].ty
    }

    pub(crate) fn value_kind(&self, value: ValueId) -> &ValueKind {
        &self.values[value.0].kind
    }

    /// The textual operand form of a prepared value: `%n` for temporaries,
    /// the literal for constants, the global id for symbol references.
    ///
    /// Panics on branch instructions (they have no result) and on values
    /// that have not been prepared; both indicate a bug in the caller, not
    /// recoverable user input.
    pub fn value_name(&self, value: ValueId) -> String {
        self.try_value_name(value)
            .unwrap_or_else(|| panic!("value has no result name: {:?}", self.values[value.0].kind))
    }

    fn try_value_name(&self, value: ValueId) -> Option<String> {
        match &self.values[value.0] {
            ValueData { kind: ValueKind::Const { text }, .. } => Some(text.clone()),
            ValueData { kind: ValueKind::SymRef { name }, .. } => Some(name.clone()),
            ValueData { kind: ValueKind::Ref { resolved, .. }, .. } => {
                self.try_value_name((*resolved)?)
            }
            ValueData { kind, res, .. } if !kind.is_terminator() => {
                res.map(|ordinal| format!("%{}", ordinal))
            }
            _ => None,
        }
    }

    /// `%label<ordinal>`; only meaningful once the block is prepared.
    pub fn block_name(&self, block: BlockId) -> String {
        match self.blocks[block.0].label {
            Some(ordinal) => format!("%label{}", ordinal),
            None => format!("%block{}", block.0),
        }
    }

    pub fn has_terminator(&self, block: BlockId) -> bool {
        self.blocks[block.0]
            .instrs
            .last()
            .is_some_and(|last| self.values[last.0].kind.is_terminator())
    }

    /// Appends `value` to `block` unless the function has already seen it.
    /// Appends to a terminated block are dropped with a warning so the
    /// single-terminator shape survives careless callers.
    pub fn add(&mut self, block: BlockId, value: ValueId) -> ValueId {
        if self.value_set.contains(&value) {
            return value;
        }
        if self.has_terminator(block) {
            log::warn!(
                "block {} of {} is terminated; dropping instruction",
                self.block_name(block),
                self.name
            );
            return value;
        }
        self.value_set.insert(value);
        self.blocks[block.0].instrs.push(value);
        value
    }

    /// Records `value` as the current binding of `register` in `block`.
    pub fn assign(&mut self, block: BlockId, register: Register, value: ValueId) {
        self.add(block, value);
        self.blocks[block.0].vars.insert(register, value);
    }

    /// Unconditional branch. Registers the predecessor edge and appends the
    /// terminator.
    pub fn branch(&mut self, block: BlockId, target: BlockId) {
        if self.has_terminator(block) {
            log::warn!("block {} of {} is terminated; dropping branch", self.block_name(block), self.name);
            return;
        }
        self.blocks[target.0].add_pred(block);
        let op = self.push_value(ValueKind::Branch { target }, Type::Void);
        self.add(block, op);
    }

    /// Conditional branch on `cond` (an `i1` value).
    pub fn branch_if(&mut self, block: BlockId, cond: ValueId, if_true: BlockId, if_false: BlockId) {
        if self.has_terminator(block) {
            log::warn!("block {} of {} is terminated; dropping branch", self.block_name(block), self.name);
            return;
        }
        self.add(block, cond);
        self.blocks[if_true.0].add_pred(block);
        self.blocks[if_false.0].add_pred(block);
        let op = self.push_value(ValueKind::BranchIf { cond, if_true, if_false }, Type::Void);
        self.add(block, op);
    }

    /// Return. A value whose type differs from the declared return type is
    /// emitted anyway; the mismatch is reported as a warning so a front-end
    /// pass can finish and surface every problem at once.
    pub fn ret(&mut self, block: BlockId, value: Option<ValueId>) {
        if self.has_terminator(block) {
            log::warn!("block {} of {} is terminated; dropping return", self.block_name(block), self.name);
            return;
        }
        match value {
            Some(v) => {
                if *self.value_type(v) != self.ty.ret {
                    log::warn!(
                        "return type mismatch in {}: declared {}, returning {}",
                        self.name,
                        self.ty.ret,
                        self.value_type(v)
                    );
                }
                self.add(block, v);
            }
            None => {
                if self.ty.ret != Type::Void {
                    log::warn!("return type mismatch in {}: declared {}, returning void", self.name, self.ty.ret);
                }
            }
        }
        let op = self.push_value(ValueKind::Return { value }, Type::Void);
        self.add(block, op);
    }

    /// Finds the value bound to `register` as seen from `block`: the local
    /// binding if one exists, otherwise a transitive lookup through
    /// single-predecessor chains. A block with several predecessors stops
    /// the walk — resolving across a join needs a phi, which reference
    /// preparation synthesises.
    pub fn resolve_var(&self, block: BlockId, register: &Register) -> Option<ValueId> {
        let mut visited: SmallVec<[BlockId; 8]> = SmallVec::new();
        let mut current = block;
        loop {
            if let Some(&value) = self.blocks[current.0].vars.get(register) {
                return Some(value);
            }
            if visited.contains(&current) {
                return None;
            }
            visited.push(current);
            match self.blocks[current.0].preds.as_slice() {
                [] => return None,
                [single] => current = *single,
                _ => {
                    log::warn!(
                        "variable {} reaches {} through several predecessors; a phi is required",
                        register,
                        self.block_name(current)
                    );
                    return None;
                }
            }
        }
    }

    /// Runs the prepare phase over every block in creation order.
    /// Idempotent: ordinals stabilise on the first run and the phi buffer
    /// is empty afterwards.
    pub fn prepare(&mut self) {
        for index in 0..self.blocks.len() {
            self.prepare_block(BlockId(index));
        }
    }

    fn prepare_block(&mut self, block: BlockId) {
        if self.blocks[block.0].label.is_none() {
            let ordinal = self.labels.next();
            self.blocks[block.0].label = Some(ordinal);
        }

        let instrs = self.blocks[block.0].instrs.clone();
        for value in instrs {
            self.prepare_value(block, value);
        }

        // Bind the synthesised phis so successors resolving the same
        // register through this block see the merged value, then splice
        // them in front of the instruction list.
        let phis = std::mem::take(&mut self.blocks[block.0].phis);
        for &phi in &phis {
            if let ValueKind::Phi { reg, .. } = &self.values[phi.0].kind {
                let reg = reg.clone();
                self.blocks[block.0].vars.insert(reg, phi);
            }
        }
        if !phis.is_empty() {
            let rest = std::mem::take(&mut self.blocks[block.0].instrs);
            let mut merged = phis;
            merged.extend(rest);
            self.blocks[block.0].instrs = merged;
        }
    }

    fn prepare_value(&mut self, block: BlockId, value: ValueId) {
        match &self.values[value.0].kind {
            // Pre-named, nothing to assign.
            ValueKind::Const { .. } | ValueKind::SymRef { .. } | ValueKind::Param { .. } => {}
            // Terminators produce no result.
            ValueKind::Branch { .. } | ValueKind::BranchIf { .. } | ValueKind::Return { .. } => {}
            ValueKind::Ref { resolved: Some(_), .. } => {}
            ValueKind::Ref { reg, .. } => {
                let reg = reg.clone();
                let found = self.resolve_var(block, &reg).filter(|&v| v != value);
                let target = match found {
                    Some(v) => v,
                    None => self.synthesise_phi(block, &reg, value),
                };
                if let ValueKind::Ref { resolved, .. } = &mut self.values[value.0].kind {
                    *resolved = Some(target);
                }
            }
            _ => {
                if self.values[value.0].res.is_none() {
                    self.values[value.0].res = Some(self.tmps.next());
                }
            }
        }
    }

    /// Builds a phi for `register` out of whatever each predecessor can
    /// resolve. Predecessors with no reaching definition contribute no
    /// entry — the shortfall is emitted as written, making the front-end
    /// bug visible in the output rather than papered over with undef.
    fn synthesise_phi(&mut self, block: BlockId, register: &Register, reference: ValueId) -> ValueId {
        let mut incoming: PhiIncoming = SmallVec::new();
        let preds = self.blocks[block.0].preds.clone();
        for pred in preds {
            let Some(found) = self.resolve_var(pred, register) else {
                continue;
            };
            let label = self.blocks[pred.0].label.map(|ordinal| format!("%label{}", ordinal));
            match (self.try_value_name(found), label) {
                (Some(name), Some(label)) => incoming.push((name, label)),
                _ => {
                    log::warn!(
                        "predecessor {} of {} is not prepared; dropping phi entry for {}",
                        self.block_name(pred),
                        self.block_name(block),
                        register
                    );
                }
            }
        }
        let ty = self.values[reference.0].ty.clone();
        let res = self.tmps.next();
        let id = ValueId(self.values.len());
        self.values.push(ValueData {
            kind: ValueKind::Phi { reg: register.clone(), incoming },
            ty,
            res: Some(res),
        });
        self.value_set.insert(id);
        self.blocks[block.0].phis.push(id);
        id
    }

    /// Prepares every block, then writes the `define` wrapper and each
    /// block's textual form.
    pub fn emit<W: Write>(&mut self, w: &mut W) -> io::Result<()> {
        self.prepare();
        let ty = Type::Function(Box::new(self.ty.clone()));
        let name = self.name.clone();
        ty.emit_def(w, &name, |w| {
            for index in 0..self.blocks.len() {
                self.emit_block(w, BlockId(index))?;
            }
            Ok(())
        })
    }

    fn emit_block<W: Write>(&self, w: &mut W, block: BlockId) -> io::Result<()> {
        let data = &self.blocks[block.0];
        let header = match data.label {
            Some(ordinal) => format!("label{}:", ordinal),
            None => format!("block{}:", block.0),
        };
        let preds: Vec<String> = data.preds.iter().map(|&p| self.block_name(p)).collect();
        if preds.is_empty() {
            writeln!(w, "{:<42}; preds =", header)?;
        } else {
            writeln!(w, "{:<42}; preds = {}", header, preds.join(", "))?;
        }
        for &value in &data.instrs {
            self.emit_value(w, value)?;
        }
        Ok(())
    }

    fn emit_value<W: Write>(&self, w: &mut W, value: ValueId) -> io::Result<()> {
        let data = &self.values[value.0];
        match &data.kind {
            // Constants, symbols, parameters and resolved references are
            // cited by name only; they emit no instruction text.
            ValueKind::Const { .. }
            | ValueKind::SymRef { .. }
            | ValueKind::Param { .. }
            | ValueKind::Ref { .. } => Ok(()),
            ValueKind::Binop { op, lhs, rhs } => writeln!(
                w,
                "  {} = {} {} {}, {}",
                self.value_name(value),
                op,
                self.value_type(*lhs),
                self.value_name(*lhs),
                self.value_name(*rhs)
            ),
            ValueKind::Phi { incoming, .. } => {
                let entries: Vec<String> = incoming
                    .iter()
                    .map(|(name, label)| format!("[ {}, {} ]", name, label))
                    .collect();
                writeln!(w, "  {} = phi {} {}", self.value_name(value), data.ty, entries.join(", "))
            }
            ValueKind::Call { callee, args } => {
                let rendered: Vec<String> = args
                    .iter()
                    .map(|&arg| format!("{} {}", self.value_type(arg), self.value_name(arg)))
                    .collect();
                writeln!(
                    w,
                    "  {} = call {} {}({})",
                    self.value_name(value),
                    data.ty,
                    callee,
                    rendered.join(", ")
                )
            }
            ValueKind::Gep { base, indices } => {
                let rendered: Vec<String> =
                    indices.iter().map(|index| format!("i64 {}", index)).collect();
                writeln!(
                    w,
                    "  {} = getelementptr {} {}, {}",
                    self.value_name(value),
                    self.value_type(*base),
                    self.value_name(*base),
                    rendered.join(", ")
                )
            }
            ValueKind::Branch { target } => {
                writeln!(w, "  br label {}", self.block_name(*target))
            }
            ValueKind::BranchIf { cond, if_true, if_false } => writeln!(
                w,
                "  br i1 {}, label {}, label {}",
                self.value_name(*cond),
                self.block_name(*if_true),
                self.block_name(*if_false)
            ),
            ValueKind::Return { value: Some(v) } => {
                writeln!(w, "  ret {} {}", self.value_type(*v), self.value_name(*v))
            }
            ValueKind::Return { value: None } => writeln!(w, "  ret void"),
        }
    }
}
