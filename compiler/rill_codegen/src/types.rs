//! Source-language types and their LIR mapping

use rill_lir as lir;
use std::fmt;

/// A Rill source type.
///
/// `Any` is the placeholder used while threading expected types through
/// expression lowering: untyped literals adopt the surrounding type, and a
/// call with no results evaluates to `Any`. Its LIR image is `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    Any,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    Str,
}

impl Ty {
    /// Resolves a type name from source text.
    pub fn from_name(name: &str) -> Option<Ty> {
        match name {
            "int" => Some(Ty::Int),
            "int8" => Some(Ty::Int8),
            "int16" => Some(Ty::Int16),
            "int32" => Some(Ty::Int32),
            "int64" => Some(Ty::Int64),
            "uint" => Some(Ty::Uint),
            "uint8" => Some(Ty::Uint8),
            "uint16" => Some(Ty::Uint16),
            "uint32" => Some(Ty::Uint32),
            "uint64" => Some(Ty::Uint64),
            "bool" => Some(Ty::Bool),
            "string" => Some(Ty::Str),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ty::Any => "any",
            Ty::Int => "int",
            Ty::Int8 => "int8",
            Ty::Int16 => "int16",
            Ty::Int32 => "int32",
            Ty::Int64 => "int64",
            Ty::Uint => "uint",
            Ty::Uint8 => "uint8",
            Ty::Uint16 => "uint16",
            Ty::Uint32 => "uint32",
            Ty::Uint64 => "uint64",
            Ty::Bool => "bool",
            Ty::Str => "string",
        }
    }

    pub fn signed(&self) -> bool {
        matches!(self, Ty::Int | Ty::Int8 | Ty::Int16 | Ty::Int32 | Ty::Int64)
    }

    /// The LIR image of this type. `int` and `uint` are 32 bits wide.
    pub fn lir_type(&self) -> lir::Type {
        match self {
            Ty::Any => lir::Type::Void,
            Ty::Int | Ty::Int32 | Ty::Uint | Ty::Uint32 => lir::Type::int(32),
            Ty::Int8 | Ty::Uint8 => lir::Type::int(8),
            Ty::Int16 | Ty::Uint16 => lir::Type::int(16),
            Ty::Int64 | Ty::Uint64 => lir::Type::int(64),
            Ty::Bool => lir::Type::int(1),
            Ty::Str => lir::Type::pointer(lir::Type::int(8)),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A function signature in source terms: named parameters and at most one
/// result. Zero results lower to `void`.
#[derive(Debug, Clone)]
pub struct FuncSig {
    pub params: Vec<(String, Ty)>,
    pub result: Option<Ty>,
}

impl FuncSig {
    pub fn lir_type(&self) -> lir::FuncType {
        let ret = self.result.map_or(lir::Type::Void, |ty| ty.lir_type());
        let params = self.params.iter().map(|(_, ty)| ty.lir_type()).collect();
        lir::FuncType::new(ret, false, params)
    }
}
