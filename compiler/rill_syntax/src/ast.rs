//! Abstract syntax tree for the Rill language

use rill_common::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub text: String,
    pub span: Span,
}

impl Ident {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self { text: text.into(), span }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A parsed source file: package clause plus function declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub package: Ident,
    pub funcs: Vec<FuncDecl>,
}

/// Function declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// At most one result type; `None` lowers to `void`.
    pub result: Option<Ident>,
    pub body: Block,
    pub span: Span,
}

/// Function parameter: `name type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    pub ty: Ident,
}

/// A braced statement list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    /// `var name type [= init]`
    Var { name: Ident, ty: Ident, init: Option<Expr> },
    /// `name = value`
    Assign { name: Ident, value: Expr },
    /// `name := value`; parsed, rejected in lowering.
    Define { name: Ident, value: Expr },
    If { cond: Expr, then_block: Block, else_block: Option<Block> },
    Return { value: Option<Expr> },
    Expr(Expr),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    /// Integer literal with its original digits and radix.
    Int { text: String, radix: u32 },
    Str(String),
    Bool(bool),
    Ident(String),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { callee: Ident, args: Vec<Expr> },
    Paren(Box<Expr>),
}

impl Expr {
    /// Whether the expression is a literal (possibly parenthesised), the
    /// shape the lowering pass refuses on both sides of a binary operator.
    pub fn is_const(&self) -> bool {
        match &self.kind {
            ExprKind::Int { .. } | ExprKind::Str(_) | ExprKind::Bool(_) => true,
            ExprKind::Paren(inner) => inner.is_const(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Rem => write!(f, "%"),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
        }
    }
}
