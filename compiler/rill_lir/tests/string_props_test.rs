//! Property tests for string-global emission

use proptest::prelude::*;
use rill_lir::{Context, Module};

fn emit_one_string(text: &str) -> String {
    let mut module = Module::new("props");
    module.const_string(text);
    let mut ctx = Context::new(Vec::new());
    ctx.add_module(module);
    ctx.emit().unwrap();
    String::from_utf8(ctx.into_writer()).unwrap()
}

proptest! {
    #[test]
    fn globals_are_printable_ascii(text in "\\PC*") {
        let out = emit_one_string(&text);
        let line = out.lines().next().unwrap();
        prop_assert!(line.starts_with("@.str0 = global "));
        // escaping leaves nothing but printable ASCII on the line
        prop_assert!(line.bytes().all(|b| (0x20..0x7f).contains(&b)));
    }

    #[test]
    fn array_length_counts_the_terminator(text in "\\PC*") {
        let out = emit_one_string(&text);
        let expected = format!("[{} x i8]", text.len() + 1);
        prop_assert!(out.contains(&expected));
    }

    #[test]
    fn initializer_always_ends_with_nul(text in "\\PC*") {
        let out = emit_one_string(&text);
        let line = out.lines().next().unwrap();
        prop_assert!(line.ends_with("\\00\""));
    }
}
