//! Diagnostics produced by the checks in this crate.
//!
//! One variant per distinct message shape, `Display` rendering the exact
//! `ERROR in line N: ...` text spec'd for the CLI's stdout output. Grounded
//! on `ASTmanipulations.py`'s `print("ERROR ...")` call sites.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Diagnostic {
    #[error("ERROR: No function called 'main' in program.")]
    NoMain,

    #[error("ERROR in line {line}: Function 'main' should not take any arguments.")]
    MainHasParams { line: u32 },

    #[error("ERROR: Multiple functions with same name '{name}'. Only one allowed.")]
    DuplicateFunctionName { name: String },

    #[error("ERROR: Redefining built-in function '{name}'.")]
    RedefinesBuiltin { name: String },

    #[error(
        "ERROR in line {line}: Found illegal input statement '{stmt}' in function '{func}'. \
Input statements may only be used in function 'main'."
    )]
    IllegalInput {
        line: u32,
        stmt: String,
        func: String,
    },

    #[error(
        "ERROR in line {line}: Found illegal output statement '{stmt}' in function '{func}'. \
Output statements may only be used in function 'main'."
    )]
    IllegalOutput {
        line: u32,
        stmt: String,
        func: String,
    },

    #[error(
        "ERROR in line {line}: Function call to '{name}' has wrong number of arguments ({supplied}). \
Expected {expected}."
    )]
    ArityMismatch {
        line: u32,
        name: String,
        supplied: usize,
        expected: usize,
    },

    #[error("ERROR in line {line}: Use of undeclared variable '{name}'.")]
    UndeclaredVar { line: u32, name: String },

    #[error("ERROR in line {line}: Output name '{name}' has already been used previously.")]
    DuplicateOutputName { line: u32, name: String },

    #[error("ERROR in line {line}: Input name '{name}' has already been used previously.")]
    DuplicateInputName { line: u32, name: String },

    #[error(
        "ERROR in line {line}: Uminus expression '{expr}' should have subexpression of type NUMBER."
    )]
    UminusNotNum { line: u32, expr: String },

    #[error(
        "ERROR in line {line}: Not-expression '{expr}' should have subexpression of type BOOLEAN."
    )]
    NotNotBool { line: u32, expr: String },

    #[error("ERROR in line {line}: Operands of binop '{expr}' have different types.")]
    BinopTypeMismatch { line: u32, expr: String },

    #[error("ERROR in line {line}: Expression '{expr}' requires operands of type BOOLEAN.")]
    BoolOpRequiresBool { line: u32, expr: String },

    #[error("ERROR in line {line}: Expression '{expr}' requires operands of type NUMBER.")]
    NumOpRequiresNum { line: u32, expr: String },

    #[error("ERROR in line {line}: If-condition '{expr}' must be of type BOOLEAN.")]
    IfCondNotBool { line: u32, expr: String },

    #[error("ERROR in line {line}: Then- and else-branch of If-expression must have same types.")]
    IfBranchMismatch { line: u32 },
}

impl Diagnostic {
    /// The source line this diagnostic is anchored to, when it has one.
    /// `NoMain`/`DuplicateFunctionName`/`RedefinesBuiltin` have none --
    /// the original prints them with no line number either.
    pub fn line(&self) -> Option<u32> {
        match self {
            Diagnostic::NoMain
            | Diagnostic::DuplicateFunctionName { .. }
            | Diagnostic::RedefinesBuiltin { .. } => None,
            Diagnostic::MainHasParams { line }
            | Diagnostic::IllegalInput { line, .. }
            | Diagnostic::IllegalOutput { line, .. }
            | Diagnostic::ArityMismatch { line, .. }
            | Diagnostic::UndeclaredVar { line, .. }
            | Diagnostic::DuplicateOutputName { line, .. }
            | Diagnostic::DuplicateInputName { line, .. }
            | Diagnostic::UminusNotNum { line, .. }
            | Diagnostic::NotNotBool { line, .. }
            | Diagnostic::BinopTypeMismatch { line, .. }
            | Diagnostic::BoolOpRequiresBool { line, .. }
            | Diagnostic::NumOpRequiresNum { line, .. }
            | Diagnostic::IfCondNotBool { line, .. }
            | Diagnostic::IfBranchMismatch { line } => Some(*line),
        }
    }
}
