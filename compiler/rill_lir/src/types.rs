//! Type descriptors for LIR values
//!
//! Types have value semantics and structural equality. The textual name of a
//! type (its `Display` form) is what every operand citation uses, so the
//! formatting here defines the concrete LIR dialect.

use crate::error::LirError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// A function signature: return type, parameter types, variadic flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncType {
    pub ret: Type,
    pub params: Vec<Type>,
    pub variadic: bool,
}

impl FuncType {
    pub fn new(ret: Type, variadic: bool, params: Vec<Type>) -> Self {
        Self { ret, params, variadic }
    }

    /// The comma-separated parameter list, with a trailing `...` for
    /// variadic signatures.
    fn params_string(&self) -> String {
        let mut parts: Vec<String> = self.params.iter().map(Type::to_string).collect();
        if self.variadic {
            parts.push("...".to_string());
        }
        parts.join(", ")
    }
}

/// A LIR type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// `i<width>`, width one of 1, 8, 16, 32, 64.
    Int(u32),
    /// A typed pointer, named `<pointee> *`.
    Pointer(Box<Type>),
    /// A fixed-size array, named `[N x T]`. Dereferences to a pointer to
    /// its element type.
    Array(Box<Type>, u64),
    Void,
    /// A function signature; named by the signature itself.
    Function(Box<FuncType>),
}

impl Type {
    pub fn int(width: u32) -> Type {
        Type::Int(width)
    }

    pub fn pointer(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    pub fn array(element: Type, count: u64) -> Type {
        Type::Array(Box::new(element), count)
    }

    pub fn function(ret: Type, variadic: bool, params: Vec<Type>) -> Type {
        Type::Function(Box::new(FuncType::new(ret, variadic, params)))
    }

    /// Strips one layer of indirection: a pointer yields its pointee, an
    /// array yields a pointer to its element type.
    pub fn dereference(&self) -> Result<Type, LirError> {
        match self {
            Type::Pointer(pointee) => Ok((**pointee).clone()),
            Type::Array(element, _) => Ok(Type::Pointer(element.clone())),
            other => Err(LirError::NonDereferenceable(other.to_string())),
        }
    }

    /// Folds `dereference` once per index; this is how `getelementptr`
    /// result types are computed.
    pub fn dereference_n(&self, count: usize) -> Result<Type, LirError> {
        let mut ty = self.clone();
        for _ in 0..count {
            ty = ty.dereference()?;
        }
        Ok(ty)
    }

    /// Emits an external declaration line: `declare` for functions, an
    /// `external global` otherwise.
    pub fn emit_decl<W: Write>(&self, w: &mut W, name: &str) -> io::Result<()> {
        match self {
            Type::Function(ft) => {
                writeln!(w, "declare {} {}({})", ft.ret, name, ft.params_string())
            }
            other => writeln!(w, "{} = external global {}", name, other),
        }
    }

    /// Emits a definition wrapping `body`: a `define … { … }` skeleton for
    /// functions, a single `global` line otherwise (with `body` writing the
    /// initializer).
    pub fn emit_def<W, F>(&self, w: &mut W, name: &str, body: F) -> io::Result<()>
    where
        W: Write,
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        match self {
            Type::Function(ft) => {
                writeln!(w, "define {} {}({}) {{", ft.ret, name, ft.params_string())?;
                body(w)?;
                writeln!(w, "}}")
            }
            other => {
                write!(w, "{} = global {} ", name, other)?;
                body(w)?;
                writeln!(w)
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int(width) => write!(f, "i{}", width),
            Type::Pointer(pointee) => write!(f, "{} *", pointee),
            Type::Array(element, count) => write!(f, "[{} x {}]", count, element),
            Type::Void => write!(f, "void"),
            Type::Function(ft) => write!(f, "{} ({})", ft.ret, ft.params_string()),
        }
    }
}
