//! Static validation: call-graph/recursion checking, the five semantic
//! checks of §4.2, and the bivalent type checker of §4.3.

mod callgraph;
mod diagnostic;
mod error;
mod semantic;
mod typecheck;

pub use callgraph::{check_recursion, CallGraph};
pub use diagnostic::Diagnostic;
pub use error::CheckError;
pub use semantic::{check_bad_func_calls, check_illegal_io, check_io_names, check_main, check_undeclared_var};
pub use typecheck::type_check_bool_num;
