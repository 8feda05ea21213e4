//! Lowering from the Rill AST to LIR
//!
//! The pass is two-phase: first every function signature is collected so
//! calls can reference functions declared later in the file, then each body
//! is lowered through a `rill_lir` builder. Variable accesses go through
//! registers — writes via `assign`, reads via `ref_var` — and the IR layer
//! resolves them into SSA form during emission.

use crate::types::{FuncSig, Ty};
use hashbrown::HashMap;
use rill_common::{CompileError, CompileResult, Notices, Sequence, Span, Stage};
use rill_lir as lir;
use rill_syntax::ast;

fn err_at(span: Span, message: impl Into<String>) -> CompileError {
    Stage::Lower.error_at(span.start, message)
}

/// Lowers a parsed file into a LIR module named after its package.
/// Warning-class findings are appended to `notices`; only errors stop the
/// pass.
pub fn compile(file: &ast::File, notices: &mut Notices) -> CompileResult<lir::Module> {
    let mut module = lir::Module::new(file.package.text.clone());
    let funcs = collect_signatures(file)?;
    for decl in &file.funcs {
        lower_function(&mut module, &funcs, decl, notices)?;
    }
    Ok(module)
}

fn collect_signatures(file: &ast::File) -> CompileResult<HashMap<String, FuncSig>> {
    let mut funcs = HashMap::new();
    for decl in &file.funcs {
        let mut params = Vec::new();
        for param in &decl.params {
            params.push((param.name.text.clone(), resolve_type(&param.ty)?));
        }
        let result = match &decl.result {
            Some(name) => Some(resolve_type(name)?),
            None => None,
        };
        let sig = FuncSig { params, result };
        if funcs.insert(decl.name.text.clone(), sig).is_some() {
            return Err(err_at(
                decl.name.span,
                format!("multiple declarations of {}", decl.name.text),
            ));
        }
    }
    Ok(funcs)
}

fn resolve_type(name: &ast::Ident) -> CompileResult<Ty> {
    Ty::from_name(&name.text)
        .ok_or_else(|| err_at(name.span, format!("unknown type: {}", name.text)))
}

fn lower_function(
    module: &mut lir::Module,
    funcs: &HashMap<String, FuncSig>,
    decl: &ast::FuncDecl,
    notices: &mut Notices,
) -> CompileResult<()> {
    let sig = funcs[&decl.name.text].clone();
    let fid = module.new_function(format!("@{}", decl.name.text), sig.lir_type());
    let mut lower = FnLower {
        builder: module.builder(fid),
        funcs,
        notices,
        name: decl.name.text.clone(),
        result: sig.result,
        scopes: Vec::new(),
        scope_seq: Sequence::new(),
    };
    lower.run(&sig, decl)
}

#[derive(Clone)]
struct Symbol {
    ty: Ty,
    register: lir::Register,
}

struct Scope {
    id: u32,
    vars: HashMap<String, Symbol>,
}

struct FnLower<'m, 'f> {
    builder: lir::Builder<'m>,
    funcs: &'f HashMap<String, FuncSig>,
    notices: &'f mut Notices,
    name: String,
    result: Option<Ty>,
    scopes: Vec<Scope>,
    scope_seq: Sequence,
}

impl<'m, 'f> FnLower<'m, 'f> {
    fn run(&mut self, sig: &FuncSig, decl: &ast::FuncDecl) -> CompileResult<()> {
        let entry = self.builder.new_block();
        self.builder.set_insertion_point(entry);
        self.push_scope();

        for (index, (pname, pty)) in sig.params.iter().enumerate() {
            let register = self.fresh_register(pname);
            let value = self.builder.param(index);
            self.builder.assign(register.clone(), value);
            self.declare(pname, Symbol { ty: *pty, register }, decl.name.span)?;
        }

        for stmt in &decl.body.stmts {
            self.lower_stmt(stmt)?;
        }
        self.pop_scope();

        if !self.builder.is_terminated() {
            match self.result {
                None => self.builder.ret_void(),
                Some(_) => {
                    let message = format!(
                        "function {} can fall off the end without returning a value",
                        self.name
                    );
                    log::warn!("{}", message);
                    self.notices.warn(Some(decl.name.span.start), message);
                }
            }
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &ast::Stmt) -> CompileResult<()> {
        match &stmt.kind {
            ast::StmtKind::Var { name, ty, init } => {
                let ty = resolve_type(ty)?;
                let value = match init {
                    Some(expr) => {
                        let (value, found) = self.eval(ty, expr)?;
                        self.check_types(ty, found, expr.span)?;
                        value
                    }
                    None => self.builder.const_int(&ty.lir_type(), 0),
                };
                let register = self.fresh_register(&name.text);
                self.declare(&name.text, Symbol { ty, register: register.clone() }, name.span)?;
                self.builder.assign(register, value);
                Ok(())
            }
            ast::StmtKind::Assign { name, value } => {
                let symbol = self.resolve(&name.text, name.span)?;
                let (value, found) = self.eval(symbol.ty, value)?;
                self.check_types(symbol.ty, found, stmt.span)?;
                self.builder.assign(symbol.register, value);
                Ok(())
            }
            ast::StmtKind::Define { name, .. } => Err(err_at(
                name.span,
                "short variable declarations need type inference, which is not implemented; use var",
            )),
            ast::StmtKind::If { cond, then_block, else_block } => {
                let (cond_value, cond_ty) = self.eval(Ty::Bool, cond)?;
                if cond_ty != Ty::Bool {
                    return Err(err_at(
                        cond.span,
                        format!("if condition must be bool, found {}", cond_ty),
                    ));
                }

                let if_true = self.builder.new_block();
                let if_false = self.builder.new_block();
                let end_if = self.builder.new_block();
                self.builder.branch_if(cond_value, if_true, if_false);

                self.builder.set_insertion_point(if_true);
                self.lower_block(then_block)?;
                self.builder.branch(end_if);

                self.builder.set_insertion_point(if_false);
                if let Some(else_block) = else_block {
                    self.lower_block(else_block)?;
                }
                self.builder.branch(end_if);

                self.builder.set_insertion_point(end_if);
                Ok(())
            }
            ast::StmtKind::Return { value } => match (self.result, value) {
                (Some(expected), Some(expr)) => {
                    let (value, found) = self.eval(expected, expr)?;
                    self.check_types(expected, found, expr.span)?;
                    self.builder.ret(value);
                    Ok(())
                }
                (None, None) => {
                    self.builder.ret_void();
                    Ok(())
                }
                (Some(_), None) => Err(err_at(stmt.span, "too few values to return")),
                (None, Some(_)) => Err(err_at(stmt.span, "too many values to return")),
            },
            ast::StmtKind::Expr(expr) => {
                self.eval(Ty::Any, expr)?;
                Ok(())
            }
        }
    }

    fn lower_block(&mut self, block: &ast::Block) -> CompileResult<()> {
        self.push_scope();
        for stmt in &block.stmts {
            self.lower_stmt(stmt)?;
        }
        self.pop_scope();
        Ok(())
    }

    /// Evaluates an expression, threading the type the context expects so
    /// untyped literals can adopt it.
    fn eval(&mut self, expected: Ty, expr: &ast::Expr) -> CompileResult<(lir::ValueId, Ty)> {
        match &expr.kind {
            ast::ExprKind::Int { text, radix } => {
                let ty = if expected == Ty::Any { Ty::Int } else { expected };
                match ty {
                    Ty::Bool => {
                        Err(err_at(expr.span, "boolean arithmetic is not allowed"))
                    }
                    Ty::Str | Ty::Any => Err(err_at(
                        expr.span,
                        format!("integer literal cannot have type {}", ty),
                    )),
                    _ => {
                        let value = self
                            .builder
                            .const_int_from_str(&ty.lir_type(), text, *radix)
                            .map_err(|err| err_at(expr.span, err.to_string()))?;
                        Ok((value, ty))
                    }
                }
            }
            ast::ExprKind::Str(text) => {
                let global = self.builder.const_string(text);
                let base = self.builder.symbol(&global);
                let ptr = self.builder.gep(base, &[0, 0])?;
                Ok((ptr, Ty::Str))
            }
            ast::ExprKind::Bool(value) => {
                let value = self.builder.const_int(&Ty::Bool.lir_type(), i64::from(*value));
                Ok((value, Ty::Bool))
            }
            ast::ExprKind::Ident(name) => {
                let symbol = self.resolve(name, expr.span)?;
                let value = self.builder.ref_var(&symbol.ty.lir_type(), symbol.register);
                Ok((value, symbol.ty))
            }
            ast::ExprKind::Paren(inner) => self.eval(expected, inner),
            ast::ExprKind::Binary { op, lhs, rhs } => {
                self.eval_binary(expected, expr.span, *op, lhs, rhs)
            }
            ast::ExprKind::Call { callee, args } => self.eval_call(expr.span, callee, args),
        }
    }

    fn eval_binary(
        &mut self,
        expected: Ty,
        span: Span,
        op: ast::BinOp,
        lhs: &ast::Expr,
        rhs: &ast::Expr,
    ) -> CompileResult<(lir::ValueId, Ty)> {
        if lhs.is_const() && rhs.is_const() {
            return Err(err_at(
                span,
                "binary expressions with only constant operands are not supported",
            ));
        }

        // Evaluate the non-constant side first so the literal side can
        // adopt its type.
        let (lhs_value, mut lhs_ty, rhs_value, mut rhs_ty) = if lhs.is_const() {
            let (rv, rt) = self.eval(expected, rhs)?;
            let (lv, lt) = self.eval(rt, lhs)?;
            (lv, lt, rv, rt)
        } else {
            let (lv, lt) = self.eval(expected, lhs)?;
            let (rv, rt) = self.eval(lt, rhs)?;
            (lv, lt, rv, rt)
        };

        if lhs_ty == Ty::Any {
            lhs_ty = rhs_ty;
        }
        if rhs_ty == Ty::Any {
            rhs_ty = lhs_ty;
        }
        if lhs_ty != rhs_ty {
            return Err(err_at(
                span,
                format!("types {} and {} are not compatible", lhs_ty, rhs_ty),
            ));
        }
        if lhs_ty == Ty::Str {
            return Err(err_at(span, format!("operator {} is not defined on string", op)));
        }
        if lhs_ty == Ty::Bool {
            return Err(err_at(span, "boolean arithmetic is not allowed"));
        }

        let value = match op {
            ast::BinOp::Add => self.builder.iadd(lhs_value, rhs_value),
            ast::BinOp::Sub => self.builder.isub(lhs_value, rhs_value),
            ast::BinOp::Mul => self.builder.imul(lhs_value, rhs_value),
            ast::BinOp::Div => self.builder.isdiv(lhs_value, rhs_value),
            ast::BinOp::Rem => self.builder.isrem(lhs_value, rhs_value),
            ast::BinOp::Lt => {
                let v = self.builder.icmp(lir::IntPredicate::Slt, lhs_value, rhs_value);
                return Ok((v, Ty::Bool));
            }
            ast::BinOp::Gt => {
                let v = self.builder.icmp(lir::IntPredicate::Sgt, lhs_value, rhs_value);
                return Ok((v, Ty::Bool));
            }
        };
        Ok((value, lhs_ty))
    }

    fn eval_call(
        &mut self,
        span: Span,
        callee: &ast::Ident,
        args: &[ast::Expr],
    ) -> CompileResult<(lir::ValueId, Ty)> {
        let name = &callee.text;

        if let Some(sig) = self.funcs.get(name).cloned() {
            if args.len() != sig.params.len() {
                return Err(err_at(
                    span,
                    format!("{} takes {} arguments, {} given", name, sig.params.len(), args.len()),
                ));
            }
            let mut values = Vec::with_capacity(args.len());
            for (arg, (_, pty)) in args.iter().zip(&sig.params) {
                let (value, found) = self.eval(*pty, arg)?;
                self.check_types(*pty, found, arg.span)?;
                values.push(value);
            }
            let fty = lir::Type::Function(Box::new(sig.lir_type()));
            let value = self.builder.call(&fty, &format!("@{}", name), &values);
            return Ok((value, sig.result.unwrap_or(Ty::Any)));
        }

        if name == "printf" {
            return self.eval_printf(span, args);
        }

        if Ty::from_name(name).is_some() {
            return Err(err_at(span, "type conversions are not implemented"));
        }
        if self.lookup(name).is_some() {
            return Err(err_at(span, format!("calling a non-function: {}", name)));
        }
        Err(err_at(span, format!("cannot resolve symbol: {}", name)))
    }

    /// The `printf` built-in: declared as the variadic external
    /// `i32 (i8 *, ...)` on first use.
    fn eval_printf(&mut self, span: Span, args: &[ast::Expr]) -> CompileResult<(lir::ValueId, Ty)> {
        let Some((format, rest)) = args.split_first() else {
            return Err(err_at(span, "printf needs a format string"));
        };
        let (format_value, format_ty) = self.eval(Ty::Str, format)?;
        if format_ty != Ty::Str {
            return Err(err_at(
                format.span,
                format!("printf format must be a string, found {}", format_ty),
            ));
        }
        let mut values = vec![format_value];
        for arg in rest {
            let (value, _) = self.eval(Ty::Any, arg)?;
            values.push(value);
        }
        let printf_ty =
            lir::Type::function(lir::Type::int(32), true, vec![lir::Type::pointer(lir::Type::int(8))]);
        let symbol = self.builder.declare_external("@printf", printf_ty);
        let value = self.builder.call(symbol.ty(), symbol.name(), &values);
        Ok((value, Ty::Int))
    }

    fn check_types(&self, expected: Ty, found: Ty, span: Span) -> CompileResult<()> {
        if found != expected && found != Ty::Any {
            return Err(err_at(
                span,
                format!("types {} and {} are not compatible", expected, found),
            ));
        }
        Ok(())
    }

    // scope handling

    fn push_scope(&mut self) {
        let id = self.scope_seq.next();
        self.scopes.push(Scope { id, vars: HashMap::new() });
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn current_scope_id(&self) -> u32 {
        self.scopes.last().map_or(0, |scope| scope.id)
    }

    fn fresh_register(&self, name: &str) -> lir::Register {
        lir::Register::new(name, self.current_scope_id())
    }

    fn declare(&mut self, name: &str, symbol: Symbol, span: Span) -> CompileResult<()> {
        let scope = self.scopes.last_mut().expect("no open scope");
        if scope.vars.contains_key(name) {
            return Err(err_at(span, format!("multiple declarations of {}", name)));
        }
        scope.vars.insert(name.to_string(), symbol);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.vars.get(name).cloned())
    }

    fn resolve(&self, name: &str, span: Span) -> CompileResult<Symbol> {
        self.lookup(name)
            .ok_or_else(|| err_at(span, format!("cannot resolve symbol: {}", name)))
    }
}
