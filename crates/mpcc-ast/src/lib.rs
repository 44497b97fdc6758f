//! AST model for the secret-aware expression language compiled by `mpcc`.
//!
//! This crate owns the tagged-variant tree the rest of the workspace passes
//! around: [`Program`] is an ordered list of [`Function`]s, each with a
//! [`FunctionBody`] of [`Stmt`]s and an optional trailing [`Expr`]. Every
//! expression node carries a source line (for diagnostics) plus two slots
//! filled in by later passes: `ty` (the type checker, [`Type`]) and
//! `is_public` (the smart inliner's publicness analysis). Nodes are created
//! by the parser or by rewrite passes; each has a single owner and rewrites
//! either mutate in place or return a replacement, never alias.

pub mod error;
pub mod expr;
pub mod fmt;
pub mod program;
pub mod stmt;
pub mod types;

pub use error::AstError;
pub use expr::{BinOp, Expr, ExprKind};
pub use program::{Function, FunctionBody, Program};
pub use stmt::{Stmt, StmtKind};
pub use types::Type;
