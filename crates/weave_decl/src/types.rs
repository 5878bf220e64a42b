//! Resolved types referenced by parameters, fields and return values.

use std::fmt;

use crate::ids::{EnumId, StructId};

/// Builtin scalar kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl ScalarKind {
    /// All scalar kinds in declaration order.
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Bool,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
    ];

    /// The IDL spelling of this scalar.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
    }

    /// Parses an IDL scalar spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// A resolved type.
///
/// Types are structural values: two `Type`s that compare equal denote the
/// same type, so a `Type` can be used directly as an analysis key.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    /// A builtin scalar.
    Scalar(ScalarKind),
    /// The builtin string type.
    String,
    /// A user-declared struct.
    Struct(StructId),
    /// A user-declared enum.
    Enum(EnumId),
    /// A variable-length array of the element type.
    Array(Box<Type>),
    /// An optional value of the inner type.
    Optional(Box<Type>),
}

impl Type {
    /// Shorthand for `Type::Scalar(ScalarKind::I32)`.
    pub const I32: Type = Type::Scalar(ScalarKind::I32);

    /// Returns `true` if this type is a builtin scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Scalar(_))
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
