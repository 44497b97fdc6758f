//! §4.4 through §4.11 of the compiler pipeline: every AST rewrite between
//! validation and IR emission, plus the top-level `compile` entry point
//! that sequences this crate's passes with `mpcc-check`'s validation.

mod constprop;
mod error;
mod inline;
mod lowering;
mod pipeline;
mod rewrites;
mod tmps;
mod warning;
mod xor;

pub use error::CodegenError;
pub use pipeline::{compile, compile_with_trace, CompileReport, TraceStep};
pub use rewrites::RedefRenamer;
pub use warning::Warning;

pub use inline::smart_inline_program;
pub use lowering::IfLowering;
pub use rewrites::{remove_uminus, rewrite_eq};
pub use tmps::TmpInserter;

pub use constprop::ConstProp;
pub use xor::{emit, specialize};
