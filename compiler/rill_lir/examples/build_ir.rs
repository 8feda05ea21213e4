//! Builds a small module by hand through the builder API and prints it.
//!
//! ```text
//! cargo run -p rill_lir --example build_ir
//! ```

use rill_lir::{Context, FuncType, IntPredicate, LirError, Register, Type};
use std::io::{self, Write};

fn main() -> Result<(), LirError> {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);

    let i32_ty = Type::int(32);
    let printf_ty = Type::function(i32_ty.clone(), true, vec![Type::pointer(Type::int(8))]);
    let printf = module.declare_external("@printf", printf_ty);

    let main_ty = FuncType::new(
        i32_ty.clone(),
        false,
        vec![i32_ty.clone(), Type::pointer(Type::pointer(Type::int(8)))],
    );
    let f = module.new_function("@main", main_ty);
    let mut b = module.builder(f);

    let entry = b.new_block();
    b.set_insertion_point(entry);

    let var_a = Register::new("a", 0);
    let zero = b.const_int(&i32_ty, 0);
    b.assign(var_a.clone(), zero);

    let argc = b.param(0);
    let one = b.const_int(&i32_ty, 1);
    let op1 = b.iadd(one, argc);
    let three = b.const_int(&i32_ty, 3);
    let op2 = b.iadd(op1, three);
    b.assign(var_a.clone(), op1);
    b.assign(var_a.clone(), op2);

    let if_true = b.new_block();
    let if_false = b.new_block();
    let end_if = b.new_block();

    let eleven = b.const_int_from_str(&i32_ty, "B", 16)?;
    let cond = b.icmp(IntPredicate::Sgt, op2, eleven);
    b.branch_if(cond, if_true, if_false);

    b.set_insertion_point(if_true);
    let four = b.const_int(&i32_ty, 4);
    let bumped = b.iadd(op1, four);
    b.assign(var_a.clone(), bumped);
    b.branch(end_if);

    b.set_insertion_point(if_false);
    b.branch(end_if);

    b.set_insertion_point(end_if);
    let greeting = b.const_string("hello world\n");
    let base = b.symbol(&greeting);
    let fmt = b.gep(base, &[0, 0])?;
    let merged = b.ref_var(&i32_ty, var_a);
    b.call(printf.ty(), printf.name(), &[fmt, merged]);
    b.ret(merged);

    ctx.emit()?;
    io::stdout().write_all(&ctx.into_writer())?;
    Ok(())
}
