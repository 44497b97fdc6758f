//! Errors surfaced by the top-level pipeline (§7: "compilation either
//! succeeds entirely or produces no IR").

use thiserror::Error;

use mpcc_check::{CheckError, Diagnostic};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A validation pass (§4.1/§4.2) reported one or more offenses; the
    /// pipeline halts before the next pass, per §7's "report-all-then-abort".
    #[error("compilation rejected: {} diagnostic(s)", diagnostics.len())]
    Invalid { diagnostics: Vec<Diagnostic> },

    /// A call-graph construction error (§4.1): an illegal call to `main`, or
    /// a call to an undeclared function. Raised eagerly, unlike the other
    /// validation passes, since `CallGraph.py` itself raises rather than
    /// collects these.
    #[error(transparent)]
    Check(#[from] CheckError),

    /// `check_recursion` found a reachable call cycle, a duplicate function
    /// name, or a user redefinition of `randomnum`/`randombit`. The original
    /// reports only a boolean here with no finer-grained diagnostic.
    #[error("ERROR: Program has illegal recursion, a duplicate function name, or redefines a built-in.")]
    RecursionOrOverload,
}

impl CodegenError {
    fn invalid(diagnostics: Vec<Diagnostic>) -> Self {
        CodegenError::Invalid { diagnostics }
    }
}

pub(crate) fn reject_if_any(diagnostics: Vec<Diagnostic>) -> Result<(), CodegenError> {
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(CodegenError::invalid(diagnostics))
    }
}
