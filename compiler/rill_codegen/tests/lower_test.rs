//! End-to-end lowering tests: Rill source in, LIR text out

use rill_codegen::compile;
use rill_common::{CompileError, Level, Notices, Stage};
use rill_lir::Context;
use rill_syntax::parse_source;

fn lower(source: &str) -> String {
    let file = parse_source(source).unwrap();
    let module = compile(&file, &mut Notices::new()).unwrap();
    let mut ctx = Context::new(Vec::new());
    ctx.add_module(module);
    ctx.emit().unwrap();
    String::from_utf8(ctx.into_writer()).unwrap()
}

fn lower_err(source: &str) -> CompileError {
    let file = parse_source(source).unwrap();
    compile(&file, &mut Notices::new()).unwrap_err()
}

#[test]
fn add_function() {
    let text = lower("package main\nfunc add(x int, y int) int { return x + y }");
    assert!(text.contains("define i32 @add(i32, i32) {"));
    assert!(text.contains("  %2 = add i32 %0, %1"));
    assert!(text.contains("  ret i32 %2"));
}

#[test]
fn if_else_assignment_becomes_a_phi() {
    let text = lower(
        "package main\nfunc sel(p int) int {\n  var a int = 0\n  if p > 4 { a = 10 } else { a = 20 }\n  return a\n}",
    );
    assert!(text.contains("  %1 = icmp sgt i32 %0, 4"));
    assert!(text.contains("  br i1 %1, label %label1, label %label2"));
    assert!(text.contains("  %2 = phi i32 [ 10, %label1 ], [ 20, %label2 ]"));
    assert!(text.contains("  ret i32 %2"));
    // the arms themselves need no phi
    assert_eq!(text.matches("phi").count(), 1);
}

#[test]
fn if_without_else_keeps_the_original_value() {
    let text = lower(
        "package main\nfunc sel(p int) int {\n  var a int = 0\n  if p > 4 { a = 10 }\n  return a\n}",
    );
    assert!(text.contains("  %2 = phi i32 [ 10, %label1 ], [ 0, %label2 ]"));
}

#[test]
fn hello_world_with_printf() {
    let text = lower("package main\nfunc main() int {\n  printf(\"hello world\\n\")\n  return 0\n}");
    assert!(text.contains("declare i32 @printf(i8 *, ...)"));
    assert!(text.contains("@.str0 = global [13 x i8] c\"hello world\\0A\\00\""));
    assert!(text.contains("  %0 = getelementptr [13 x i8] * @.str0, i64 0, i64 0"));
    assert!(text.contains("  %1 = call i32 @printf(i8 * %0)"));
    assert!(text.contains("  ret i32 0"));
}

#[test]
fn printf_with_extra_arguments() {
    let text = lower(
        "package main\nfunc main() int {\n  var n int = 42\n  printf(\"n = %d\\n\", n)\n  return 0\n}",
    );
    assert!(text.contains("call i32 @printf(i8 * %0, i32 42)"));
    // the external is declared once even though main also uses a string
    assert_eq!(text.matches("declare i32 @printf").count(), 1);
}

#[test]
fn calls_between_functions_use_collected_signatures() {
    let text = lower(
        "package main\nfunc main() int { return twice(21) }\nfunc twice(x int) int { return x + x }",
    );
    assert!(text.contains("  %0 = call i32 @twice(i32 21)"));
    assert!(text.contains("define i32 @twice(i32) {"));
}

#[test]
fn void_function_gets_an_implicit_return() {
    let text = lower("package main\nfunc noop() { }");
    assert!(text.contains("define void @noop() {"));
    assert!(text.contains("  ret void"));
}

#[test]
fn shadowed_variables_are_distinct_registers() {
    let text = lower(
        "package main\nfunc f(x int) int {\n  var a int = x\n  if x > 0 {\n    var a int = 1\n    a = 2\n  }\n  return a\n}",
    );
    // the outer a flows unchanged through both arms of the join
    assert!(text.contains("phi i32 [ %0, %label1 ], [ %0, %label2 ]"));
}

#[test]
fn constant_only_binary_expressions_are_rejected() {
    let err = lower_err("package main\nfunc f() int { return 1 + 2 }");
    assert!(err.to_string().contains("only constant operands"));
}

#[test]
fn short_declarations_are_rejected() {
    let err = lower_err("package main\nfunc f() { a := 1 }");
    assert!(err.to_string().contains("type inference"));
}

#[test]
fn unknown_symbols_are_reported_with_position() {
    let err = lower_err("package main\nfunc f() int { return missing }");
    assert_eq!(err.stage, Stage::Lower);
    assert_eq!(err.pos.unwrap().line, 2);
    assert!(err.to_string().contains("cannot resolve symbol: missing"));
}

#[test]
fn unknown_types_are_rejected() {
    let err = lower_err("package main\nfunc f(x float) { }");
    assert!(err.to_string().contains("unknown type: float"));
}

#[test]
fn return_arity_is_checked() {
    let err = lower_err("package main\nfunc f() int { return }");
    assert!(err.to_string().contains("too few values"));
    let err = lower_err("package main\nfunc f() { return 1 }");
    assert!(err.to_string().contains("too many values"));
}

#[test]
fn condition_must_be_bool() {
    let err = lower_err("package main\nfunc f(x int) int { if 3 { return 1 } return x }");
    assert!(err.to_string().contains("boolean arithmetic is not allowed"));
}

#[test]
fn incompatible_types_are_rejected() {
    let err = lower_err(
        "package main\nfunc f(x int, y int64) int { return x + y }",
    );
    assert!(err.to_string().contains("not compatible"));
}

#[test]
fn string_variables_hold_i8_pointers() {
    let text = lower(
        "package main\nfunc greet() int {\n  var s string = \"hi\"\n  printf(s)\n  return 0\n}",
    );
    assert!(text.contains("@.str0 = global [3 x i8] c\"hi\\00\""));
    assert!(text.contains("getelementptr [3 x i8] * @.str0, i64 0, i64 0"));
}

#[test]
fn calling_a_variable_is_an_error() {
    let err = lower_err("package main\nfunc f(x int) int { return x(1) }");
    assert!(err.to_string().contains("calling a non-function"));
}

#[test]
fn type_conversions_are_not_implemented() {
    let err = lower_err("package main\nfunc f(x int) int { return int64(x) }");
    assert!(err.to_string().contains("type conversions are not implemented"));
}

#[test]
fn falling_off_a_value_returning_function_is_a_warning() {
    let file =
        parse_source("package main\nfunc f(x int) int { if x > 0 { return 1 } }").unwrap();
    let mut notices = Notices::new();
    compile(&file, &mut notices).unwrap();
    assert_eq!(notices.len(), 1);
    let notice = notices.iter().next().unwrap();
    assert_eq!(notice.level, Level::Warning);
    assert!(notice.text.contains("fall off the end"));
}

#[test]
fn duplicate_declarations_in_one_scope_are_rejected() {
    let err = lower_err("package main\nfunc f() {\n  var a int = 1\n  var a int = 2\n}");
    assert!(err.to_string().contains("multiple declarations of a"));
}
