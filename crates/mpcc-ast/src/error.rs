//! Error types for `mpcc-ast`.

use thiserror::Error;

/// Errors raised while constructing or interpreting AST nodes outside of
/// the dedicated validation passes (those live in `mpcc-check`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AstError {
    /// A binary operator token did not match any known operator spelling.
    #[error("unknown operator spelling: '{0}'")]
    UnknownOperator(String),

    /// A type name token did not match `num` or `bool`.
    #[error("unknown type spelling: '{0}'")]
    UnknownType(String),
}
