//! Lexer and parser for the Rill language
//!
//! Rill is a small, statically typed, Go-flavoured procedural language.
//! This crate turns source text into tokens and tokens into the AST that
//! the lowering pass consumes. Statements are self-delimiting; newlines are
//! whitespace and semicolons are optional separators.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenType};

use rill_common::CompileResult;

/// Convenience entry point: source text straight to an AST.
pub fn parse_source(source: &str) -> CompileResult<ast::File> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_file()
}
