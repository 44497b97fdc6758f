//! Statement nodes.

use crate::expr::Expr;
use crate::types::Type;

/// A statement node: a [`StmtKind`] plus source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: Option<u32>,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: Option<u32>) -> Self {
        Stmt { kind, line }
    }

    /// Builds a synthetic statement with no source line.
    pub fn synthetic(kind: StmtKind) -> Self {
        Stmt::new(kind, None)
    }

    /// A plain (non-if-result) assignment.
    pub fn assign(var: impl Into<String>, expr: Expr, line: Option<u32>) -> Self {
        Stmt::new(
            StmtKind::Assign {
                var: var.into(),
                expr,
                is_if_result_assign: false,
            },
            line,
        )
    }
}

/// The statement variants of §3's data model. `JumpIfFalse`/`Jump`/
/// `ProgramPoint` are only ever produced by if-lowering (§4.8); they never
/// appear in a parsed program.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `v = e;`. `is_if_result_assign` is set only for the two synthetic
    /// assignments if-lowering emits at the join point of a public `if`.
    Assign {
        var: String,
        expr: Expr,
        is_if_result_assign: bool,
    },
    /// `v << provider : ty;`
    Input {
        var: String,
        provider: i64,
        ty: Type,
    },
    /// `v >> label;`. `value` starts as an `Identifier` but may become a
    /// literal after constant propagation rewrites a constant-valued
    /// output in place (§4.10).
    Output { value: Expr, label: String },
    /// `JZ var, target;`
    JumpIfFalse { var: Expr, target: u32 },
    /// `JMP target;`
    Jump { target: u32 },
    /// `target:`
    ProgramPoint(u32),
}
