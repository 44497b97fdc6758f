//! The bivalent type system: every expression is either `Num` or `Bool`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AstError;

/// One of the two types in the language's type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Arbitrary-precision-free integers (represented as `i64` at compile time).
    Num,
    /// Booleans, rendered as `1`/`0` in the emitted IR.
    Bool,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Num => write!(f, "num"),
            Type::Bool => write!(f, "bool"),
        }
    }
}

impl FromStr for Type {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "num" => Ok(Type::Num),
            "bool" => Ok(Type::Bool),
            other => Err(AstError::UnknownType(other.to_string())),
        }
    }
}
