//! Emission tests: straight-line code, calls, globals, block headers

use pretty_assertions::assert_eq;
use rill_lir::{Context, FuncType, Type};

fn emit(ctx: Context<Vec<u8>>) -> String {
    String::from_utf8(ctx.into_writer()).unwrap()
}

/// Lines of the output with the block-header padding collapsed, so tests
/// stay independent of the alignment column.
fn significant_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            if line.contains("; preds") {
                let (head, tail) = line.split_once(';').unwrap();
                format!("{} ;{}", head.trim_end(), tail)
            } else {
                line.to_string()
            }
        })
        .collect()
}

#[test]
fn straight_line_add() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function(
        "add",
        FuncType::new(Type::int(32), false, vec![Type::int(32), Type::int(32)]),
    );
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    let lhs = b.param(0);
    let rhs = b.param(1);
    let sum = b.iadd(lhs, rhs);
    b.ret(sum);

    ctx.emit().unwrap();
    let lines = significant_lines(&emit(ctx));
    assert_eq!(
        lines,
        vec![
            "define i32 add(i32, i32) {".to_string(),
            "label0: ; preds =".to_string(),
            "  %2 = add i32 %0, %1".to_string(),
            "  ret i32 %2".to_string(),
            "}".to_string(),
        ]
    );
}

#[test]
fn temporaries_are_dense_after_parameters() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function(
        "mix",
        FuncType::new(Type::int(32), false, vec![Type::int(32), Type::int(32)]),
    );
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    let lhs = b.param(0);
    let rhs = b.param(1);
    let sum = b.iadd(lhs, rhs);
    let prod = b.imul(sum, rhs);
    let diff = b.isub(prod, lhs);
    b.ret(diff);

    ctx.emit().unwrap();
    let text = emit(ctx);
    assert!(text.contains("  %2 = add i32 %0, %1"));
    assert!(text.contains("  %3 = mul i32 %2, %1"));
    assert!(text.contains("  %4 = sub i32 %3, %0"));
    assert!(text.contains("  ret i32 %4"));
}

#[test]
fn string_global_gep_and_printf_call() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let printf_ty = Type::function(Type::int(32), true, vec![Type::pointer(Type::int(8))]);
    let printf = module.declare_external("@printf", printf_ty);
    let f = module.new_function("@main", FuncType::new(Type::int(32), false, vec![]));
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    let hi = b.const_string("hi\n");
    let base = b.symbol(&hi);
    let fmt = b.gep(base, &[0, 0]).unwrap();
    assert_eq!(*module.function(f).value_type(fmt), Type::pointer(Type::int(8)));

    let mut b = module.builder(f);
    b.set_insertion_point(entry);
    let call = b.call(printf.ty(), printf.name(), &[fmt]);
    let zero = b.const_int(&Type::int(32), 0);
    b.ret(zero);
    assert_eq!(*module.function(f).value_type(call), Type::int(32));

    ctx.emit().unwrap();
    let text = emit(ctx);
    let declare = text.find("declare i32 @printf(i8 *, ...)").unwrap();
    let global = text.find("@.str0 = global [4 x i8] c\"hi\\0A\\00\"").unwrap();
    let define = text.find("define i32 @main() {").unwrap();
    assert!(declare < global && global < define);
    assert!(text.contains("  %0 = getelementptr [4 x i8] * @.str0, i64 0, i64 0"));
    assert!(text.contains("  %1 = call i32 @printf(i8 * %0)"));
    assert!(text.contains("  ret i32 0"));
}

#[test]
fn adding_the_same_value_three_times_emits_once() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function(
        "dedup",
        FuncType::new(Type::int(32), false, vec![Type::int(32), Type::int(32)]),
    );
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    let lhs = b.param(0);
    let rhs = b.param(1);
    let sum = b.iadd(lhs, rhs);
    b.add(sum);
    b.add(sum);
    b.ret(sum);

    ctx.emit().unwrap();
    let text = emit(ctx);
    assert_eq!(text.matches("add i32").count(), 1);
}

#[test]
fn zero_parameter_function_header() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function("zero", FuncType::new(Type::int(32), false, vec![]));
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    let v = b.const_int(&Type::int(32), 7);
    b.ret(v);

    ctx.emit().unwrap();
    assert!(emit(ctx).contains("define i32 zero() {"));
}

#[test]
fn variadic_definition_header_carries_ellipsis() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function(
        "log",
        FuncType::new(Type::Void, true, vec![Type::pointer(Type::int(8))]),
    );
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    b.ret_void();

    ctx.emit().unwrap();
    let text = emit(ctx);
    assert!(text.contains("define void log(i8 *, ...) {"));
    assert!(text.contains("  ret void"));
}

#[test]
fn empty_block_emits_header_only() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function("f", FuncType::new(Type::int(32), false, vec![]));
    let mut b = module.builder(f);
    let entry = b.new_block();
    let _orphan = b.new_block();
    b.set_insertion_point(entry);
    let v = b.const_int(&Type::int(32), 1);
    b.ret(v);

    ctx.emit().unwrap();
    let text = emit(ctx);
    assert!(text.contains("label1:"));
    let after = text.split("label1:").nth(1).unwrap();
    assert_eq!(after.lines().nth(1).unwrap(), "}");
}

#[test]
fn constant_only_arithmetic_is_allowed() {
    let mut ctx = Context::new(Vec::new());
    let m = ctx.new_module("main");
    let module = ctx.module_mut(m);
    let f = module.new_function("consts", FuncType::new(Type::int(32), false, vec![]));
    let mut b = module.builder(f);
    let entry = b.new_block();
    b.set_insertion_point(entry);
    let one = b.const_int(&Type::int(32), 1);
    let two = b.const_int(&Type::int(32), 2);
    let sum = b.iadd(one, two);
    b.ret(sum);

    ctx.emit().unwrap();
    let text = emit(ctx);
    assert!(text.contains("  %0 = add i32 1, 2"));
    assert!(text.contains("  ret i32 %0"));
}
