//! Expression nodes.
//!
//! Every expression carries an optional source `line` (set by the parser,
//! `None` for rewrite-synthesized nodes, which fall back to their owning
//! statement's line for diagnostics), an optional `ty` filled in by the type
//! checker, and an optional `is_public` filled in by the smart inliner's
//! publicness analysis. Reading `ty`/`is_public` before the owning pass has
//! run is a compiler-internal invariant violation, not a user-facing error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AstError;
use crate::stmt::Stmt;
use crate::types::Type;

/// A binary operator. `Xor` only ever appears after §4.11's XOR
/// specialization rewrites a boolean `!=` into it; the parser never
/// produces it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    Xor,
}

impl BinOp {
    /// `true` for the arithmetic operators, which require `Num` operands
    /// and produce `Num`.
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    /// `true` for the operators that require `Bool` operands (`&&`/`||`).
    pub fn is_boolean_only(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Xor => "xor",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BinOp {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "==" => BinOp::Eq,
            "!=" => BinOp::Neq,
            "<" => BinOp::Lt,
            ">" => BinOp::Gt,
            "<=" => BinOp::Le,
            ">=" => BinOp::Ge,
            "xor" => BinOp::Xor,
            other => return Err(AstError::UnknownOperator(other.to_string())),
        })
    }
}

/// An expression node: a [`ExprKind`] plus source line and the two
/// annotation slots (`ty`, `is_public`) written by the type checker and the
/// smart inliner respectively.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Option<u32>,
    pub ty: Option<Type>,
    pub is_public: Option<bool>,
}

impl Expr {
    /// Builds a fresh, unannotated expression at the given source line.
    pub fn new(kind: ExprKind, line: Option<u32>) -> Self {
        Expr {
            kind,
            line,
            ty: None,
            is_public: None,
        }
    }

    /// Builds a synthetic expression with no source line, for nodes
    /// introduced by rewrite passes.
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr::new(kind, None)
    }

    /// The publicness of this expression, as determined by the smart
    /// inliner (§4.7). Panics if queried before that pass has run --
    /// a compiler-internal invariant violation, never a user error.
    pub fn is_public(&self) -> bool {
        self.is_public
            .unwrap_or_else(|| panic!("publicness queried before smart-inline pass ran"))
    }

    /// The type of this expression, as determined by the type checker
    /// (§4.3). Panics if queried before that pass has run.
    pub fn ty(&self) -> Type {
        self.ty
            .unwrap_or_else(|| panic!("type queried before type-check pass ran"))
    }

    /// Convenience constructor for an identifier reference.
    pub fn ident(name: impl Into<String>, line: Option<u32>) -> Self {
        Expr::new(ExprKind::Identifier(name.into()), line)
    }

    /// Convenience constructor for a numeric literal, always public.
    pub fn number(value: i64) -> Self {
        let mut e = Expr::synthetic(ExprKind::Number(value));
        e.ty = Some(Type::Num);
        e.is_public = Some(true);
        e
    }

    /// Convenience constructor for a boolean literal, always public.
    pub fn boolean(value: bool) -> Self {
        let mut e = Expr::synthetic(ExprKind::Boolean(value));
        e.ty = Some(Type::Bool);
        e.is_public = Some(true);
        e
    }

    /// `true` for the atomic expression kinds: literals, plain
    /// identifiers, and if-result references. Every binop/unary operand
    /// must be atomic after §4.9's temp insertion pass.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Number(_)
                | ExprKind::Boolean(_)
                | ExprKind::Identifier(_)
                | ExprKind::IfResultId(_)
        )
    }
}

/// The expression variants of §3's data model.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(i64),
    Boolean(bool),
    Identifier(String),
    /// Synthetic identifier introduced by if-lowering (§4.8), referring to
    /// the join-point result temporary written by both branches.
    IfResultId(String),
    Uminus(Box<Expr>),
    Not(Box<Expr>),
    Leak(Box<Expr>),
    Binop(BinOp, Box<Expr>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    FuncCall(String, Vec<Expr>),
    /// A statement sequence standing in expression position: the result of
    /// smart-inlining a function call, before if-lowering flattens it into
    /// the surrounding statement stream (§4.8).
    Seq(Vec<Stmt>, Box<Expr>),
}

impl ExprKind {
    /// Wraps this kind in a non-synthetic [`Expr`] at the given line.
    pub fn at(self, line: Option<u32>) -> Expr {
        Expr::new(self, line)
    }

    /// Wraps this kind in a synthetic (line-less) [`Expr`].
    pub fn synthetic(self) -> Expr {
        Expr::synthetic(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binop_round_trips_through_display_and_from_str() {
        for op in [
            BinOp::Add,
            BinOp::Sub,
            BinOp::Mul,
            BinOp::Div,
            BinOp::And,
            BinOp::Or,
            BinOp::Eq,
            BinOp::Neq,
            BinOp::Lt,
            BinOp::Gt,
            BinOp::Le,
            BinOp::Ge,
            BinOp::Xor,
        ] {
            let spelled = op.to_string();
            assert_eq!(spelled.parse::<BinOp>().unwrap(), op);
        }
    }

    #[test]
    fn unknown_operator_spelling_is_rejected() {
        assert!("%%".parse::<BinOp>().is_err());
    }

    #[test]
    fn literals_are_atomic_and_public() {
        let n = Expr::number(42);
        assert!(n.is_atomic());
        assert!(n.is_public());
        assert_eq!(n.ty(), Type::Num);

        let b = Expr::boolean(true);
        assert!(b.is_atomic());
        assert!(b.is_public());
        assert_eq!(b.ty(), Type::Bool);
    }

    #[test]
    fn compound_expressions_are_not_atomic() {
        let sum = ExprKind::Binop(BinOp::Add, Box::new(Expr::number(1)), Box::new(Expr::number(2)))
            .synthetic();
        assert!(!sum.is_atomic());
    }

    #[test]
    #[should_panic(expected = "publicness queried before smart-inline pass ran")]
    fn publicness_panics_before_inlining_annotates_it() {
        let e = Expr::ident("x", None);
        let _ = e.is_public();
    }
}
