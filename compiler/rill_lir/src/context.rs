//! The emission context
//!
//! A `Context` owns the output writer and an ordered list of modules. The
//! whole pipeline is single-threaded and single-shot: build everything,
//! call `emit` once, and the IR is frozen.

use crate::error::LirError;
use crate::module::Module;
use std::io::Write;

/// Index of a module in its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(usize);

pub struct Context<W: Write> {
    writer: W,
    modules: Vec<Module>,
    emitted: bool,
}

impl<W: Write> Context<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, modules: Vec::new(), emitted: false }
    }

    pub fn new_module(&mut self, name: impl Into<String>) -> ModuleId {
        self.add_module(Module::new(name))
    }

    /// Adopts an externally built module.
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.modules.push(module);
        id
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0]
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Prepares and emits every module in creation order, then freezes the
    /// context; a second emission is an invariant violation.
    pub fn emit(&mut self) -> Result<(), LirError> {
        if self.emitted {
            return Err(LirError::Invariant("context has already been emitted".to_string()));
        }
        self.emitted = true;
        let Context { writer, modules, .. } = self;
        for module in modules.iter_mut() {
            module.emit(&mut *writer)?;
        }
        Ok(())
    }

    /// Consumes the context, handing back the writer (useful when emitting
    /// into a buffer).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FuncType, Type};

    #[test]
    fn emit_is_single_shot() {
        let mut ctx = Context::new(Vec::new());
        ctx.new_module("main");
        ctx.emit().unwrap();
        let err = ctx.emit().unwrap_err();
        assert!(matches!(err, LirError::Invariant(_)));
    }

    #[test]
    fn modules_emit_in_creation_order() {
        let mut ctx = Context::new(Vec::new());
        let first = ctx.new_module("first");
        let second = ctx.new_module("second");
        ctx.module_mut(first).new_function("@a", FuncType::new(Type::Void, false, vec![]));
        ctx.module_mut(second).new_function("@b", FuncType::new(Type::Void, false, vec![]));
        ctx.emit().unwrap();
        let text = String::from_utf8(ctx.into_writer()).unwrap();
        assert!(text.find("@a").unwrap() < text.find("@b").unwrap());
    }
}
