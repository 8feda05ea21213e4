//! The instruction builder
//!
//! A `Builder` is a cursor, not a factory: it remembers the current
//! insertion block and forwards every construction call to it. Values are
//! appended in the order the methods are called, which is also the order
//! they will execute.

use crate::block::BlockId;
use crate::error::LirError;
use crate::function::{FuncId, Function};
use crate::module::Module;
use crate::types::Type;
use crate::value::{IntPredicate, Opcode, Register, SymRef, ValueId, ValueKind};
use smallvec::SmallVec;

pub struct Builder<'m> {
    module: &'m mut Module,
    function: FuncId,
    block: Option<BlockId>,
}

impl<'m> Builder<'m> {
    pub(crate) fn new(module: &'m mut Module, function: FuncId) -> Self {
        Self { module, function, block: None }
    }

    fn fun(&mut self) -> &mut Function {
        self.module.function_mut(self.function)
    }

    fn fun_ref(&self) -> &Function {
        self.module.function(self.function)
    }

    fn cursor(&self) -> BlockId {
        match self.block {
            Some(block) => block,
            None => panic!("builder has no insertion point"),
        }
    }

    /// Allocates a new empty block in the current function.
    pub fn new_block(&mut self) -> BlockId {
        self.fun().new_block()
    }

    pub fn set_insertion_point(&mut self, block: BlockId) {
        self.block = Some(block);
    }

    pub fn insert_block(&self) -> BlockId {
        self.cursor()
    }

    /// Whether the insertion block already ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.fun_ref().has_terminator(self.cursor())
    }

    pub fn param(&self, index: usize) -> ValueId {
        self.fun_ref().param(index)
    }

    /// An integer constant. Emits nothing; the literal text is the name.
    pub fn const_int(&mut self, ty: &Type, value: i64) -> ValueId {
        let ty = ty.clone();
        self.fun().push_value(ValueKind::Const { text: value.to_string() }, ty)
    }

    /// An integer constant parsed from `text` in the given radix; the
    /// emitted literal is always decimal.
    pub fn const_int_from_str(
        &mut self,
        ty: &Type,
        text: &str,
        radix: u32,
    ) -> Result<ValueId, LirError> {
        let value = i64::from_str_radix(text, radix)
            .map_err(|_| LirError::InvalidLiteral { text: text.to_string(), radix })?;
        Ok(self.const_int(ty, value))
    }

    /// Materialises a module-level symbol as an operand in this function.
    pub fn symbol(&mut self, sym: &SymRef) -> ValueId {
        let kind = ValueKind::SymRef { name: sym.name().to_string() };
        let ty = sym.ty().clone();
        self.fun().push_value(kind, ty)
    }

    /// Interns a string literal in the enclosing module. See
    /// [`Module::const_string`].
    pub fn const_string(&mut self, text: &str) -> SymRef {
        self.module.const_string(text)
    }

    /// Declares an external symbol in the enclosing module. See
    /// [`Module::declare_external`].
    pub fn declare_external(&mut self, name: impl Into<String>, ty: Type) -> SymRef {
        self.module.declare_external(name, ty)
    }

    /// Appends an already-constructed value to the insertion block. Adding
    /// the same value again anywhere in the function is a no-op.
    pub fn add(&mut self, value: ValueId) -> ValueId {
        let block = self.cursor();
        self.fun().add(block, value)
    }

    /// Records `value` as the current binding of `register`.
    pub fn assign(&mut self, register: Register, value: ValueId) {
        let block = self.cursor();
        self.fun().assign(block, register, value);
    }

    /// Reads `register`. The reference resolves during preparation, either
    /// to an existing binding or to a synthesised phi; `ty` is the type the
    /// merged value will carry.
    pub fn ref_var(&mut self, ty: &Type, register: Register) -> ValueId {
        let ty = ty.clone();
        let value = self.fun().push_value(ValueKind::Ref { reg: register, resolved: None }, ty);
        self.add(value)
    }

    fn binop(&mut self, op: Opcode, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = match op {
            Opcode::ICmp(_) => Type::int(1),
            _ => self.fun_ref().value_type(lhs).clone(),
        };
        let value = self.fun().push_value(ValueKind::Binop { op, lhs, rhs }, ty);
        self.add(value)
    }

    pub fn iadd(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binop(Opcode::Add, lhs, rhs)
    }

    pub fn isub(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binop(Opcode::Sub, lhs, rhs)
    }

    pub fn imul(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binop(Opcode::Mul, lhs, rhs)
    }

    pub fn isdiv(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binop(Opcode::SDiv, lhs, rhs)
    }

    pub fn isrem(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binop(Opcode::SRem, lhs, rhs)
    }

    /// Integer comparison; the result is always `i1`.
    pub fn icmp(&mut self, pred: IntPredicate, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.binop(Opcode::ICmp(pred), lhs, rhs)
    }

    /// Calls `callee`. `callee_ty` may be the function type or a pointer to
    /// it (as returned by `declare_external`); the call's result type is the
    /// signature's return type.
    pub fn call(&mut self, callee_ty: &Type, callee: &str, args: &[ValueId]) -> ValueId {
        let ret = return_type_of(callee_ty);
        let kind = ValueKind::Call { callee: callee.to_string(), args: args.to_vec() };
        let value = self.fun().push_value(kind, ret);
        self.add(value)
    }

    /// Address calculation. The result type folds one dereference per
    /// index over the base's type.
    pub fn gep(&mut self, base: ValueId, indices: &[i64]) -> Result<ValueId, LirError> {
        let ty = self.fun_ref().value_type(base).dereference_n(indices.len())?;
        let kind = ValueKind::Gep { base, indices: SmallVec::from_slice(indices) };
        let value = self.fun().push_value(kind, ty);
        Ok(self.add(value))
    }

    /// Unconditional branch; terminates the insertion block.
    pub fn branch(&mut self, target: BlockId) {
        let block = self.cursor();
        self.fun().branch(block, target);
    }

    /// Conditional branch; terminates the insertion block.
    pub fn branch_if(&mut self, cond: ValueId, if_true: BlockId, if_false: BlockId) {
        let block = self.cursor();
        self.fun().branch_if(block, cond, if_true, if_false);
    }

    /// Return with a value; terminates the insertion block.
    pub fn ret(&mut self, value: ValueId) {
        let block = self.cursor();
        self.fun().ret(block, Some(value));
    }

    /// Return without a value; terminates the insertion block.
    pub fn ret_void(&mut self) {
        let block = self.cursor();
        self.fun().ret(block, None);
    }
}

/// The return type a call through `ty` produces: pointers to functions are
/// chased, plain function types yield their return type, and anything else
/// is taken as the caller-supplied result type.
fn return_type_of(ty: &Type) -> Type {
    match ty {
        Type::Pointer(inner) => return_type_of(inner),
        Type::Function(ft) => ft.ret.clone(),
        other => other.clone(),
    }
}
