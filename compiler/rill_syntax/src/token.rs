//! Token definitions for the Rill language

use rill_common::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token types in the Rill language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    // Literals. Integer literals keep their digits and radix so the
    // lowering pass can parse them against the expected type.
    IntegerLiteral { text: String, radix: u32 },
    StringLiteral(String),

    Identifier(String),

    // Keywords
    KeywordPackage,
    KeywordFunc,
    KeywordVar,
    KeywordIf,
    KeywordElse,
    KeywordReturn,
    KeywordTrue,
    KeywordFalse,

    // Operators
    Plus,     // +
    Minus,    // -
    Multiply, // *
    Divide,   // /
    Modulo,   // %
    Less,     // <
    Greater,  // >
    Assign,   // =
    Define,   // :=

    // Delimiters
    LeftParen,  // (
    RightParen, // )
    LeftBrace,  // {
    RightBrace, // }
    Comma,      // ,
    Semicolon,  // ;

    EndOfFile,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::IntegerLiteral { text, radix: 16 } => write!(f, "0x{}", text),
            TokenType::IntegerLiteral { text, .. } => write!(f, "{}", text),
            TokenType::StringLiteral(s) => write!(f, "{:?}", s),
            TokenType::Identifier(name) => write!(f, "{}", name),
            TokenType::KeywordPackage => write!(f, "package"),
            TokenType::KeywordFunc => write!(f, "func"),
            TokenType::KeywordVar => write!(f, "var"),
            TokenType::KeywordIf => write!(f, "if"),
            TokenType::KeywordElse => write!(f, "else"),
            TokenType::KeywordReturn => write!(f, "return"),
            TokenType::KeywordTrue => write!(f, "true"),
            TokenType::KeywordFalse => write!(f, "false"),
            TokenType::Plus => write!(f, "+"),
            TokenType::Minus => write!(f, "-"),
            TokenType::Multiply => write!(f, "*"),
            TokenType::Divide => write!(f, "/"),
            TokenType::Modulo => write!(f, "%"),
            TokenType::Less => write!(f, "<"),
            TokenType::Greater => write!(f, ">"),
            TokenType::Assign => write!(f, "="),
            TokenType::Define => write!(f, ":="),
            TokenType::LeftParen => write!(f, "("),
            TokenType::RightParen => write!(f, ")"),
            TokenType::LeftBrace => write!(f, "{{"),
            TokenType::RightBrace => write!(f, "}}"),
            TokenType::Comma => write!(f, ","),
            TokenType::Semicolon => write!(f, ";"),
            TokenType::EndOfFile => write!(f, "<eof>"),
        }
    }
}

impl TokenType {
    /// Maps an identifier's text to its keyword, if it is one.
    pub fn keyword(text: &str) -> Option<TokenType> {
        match text {
            "package" => Some(TokenType::KeywordPackage),
            "func" => Some(TokenType::KeywordFunc),
            "var" => Some(TokenType::KeywordVar),
            "if" => Some(TokenType::KeywordIf),
            "else" => Some(TokenType::KeywordElse),
            "return" => Some(TokenType::KeywordReturn),
            "true" => Some(TokenType::KeywordTrue),
            "false" => Some(TokenType::KeywordFalse),
            _ => None,
        }
    }
}

/// A token and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenType,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenType, span: Span) -> Self {
        Self { kind, span }
    }
}
