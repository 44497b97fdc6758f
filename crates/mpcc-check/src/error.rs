//! Hard failures raised eagerly during call-graph construction, rather than
//! collected into a [`crate::diagnostic::Diagnostic`] list. `CallGraph.py`
//! raises a Python exception for these instead of printing and continuing;
//! this crate mirrors that by returning `Err` immediately.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("ERROR in line {line}: Illegal function call to 'main'.")]
    CallToMain { line: u32 },

    #[error("ERROR in line {line}: Calling undeclared function '{name}'.")]
    UndeclaredFunction { line: u32, name: String },
}
