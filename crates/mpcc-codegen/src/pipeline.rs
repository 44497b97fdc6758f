//! The top-level compile pipeline, grounded on `Compiler.py`'s
//! `compile_program`/`compile_program_with_prints`.
//!
//! Sequences every check and rewrite in the fixed order of spec.md §2/§4:
//! semantic validation, the bivalent type check, then the rewrite chain of
//! §4.4–§4.11, finishing with IR emission. Each validation stage that finds
//! an offense halts the pipeline before the next stage runs (§7).

use serde::{Deserialize, Serialize};

use mpcc_ast::Program;
use mpcc_check::{
    check_bad_func_calls, check_illegal_io, check_io_names, check_main, check_recursion,
    check_undeclared_var, type_check_bool_num,
};

use crate::error::{reject_if_any, CodegenError};
use crate::inline::smart_inline_program;
use crate::lowering::IfLowering;
use crate::rewrites::{remove_uminus, rewrite_eq, RedefRenamer};
use crate::tmps::TmpInserter;
use crate::warning::Warning;
use crate::{constprop::ConstProp, xor};

/// A completed compilation: the emitted IR plus every non-fatal warning
/// collected along the way. Serializable so the CLI's `--json` flag can
/// dump it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileReport {
    pub ir: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// A snapshot of `main` after a given pass, for `compile_with_trace`'s
/// `--trace` debug output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub pass: &'static str,
    pub program: String,
}

/// Runs the full pipeline: validation, then the rewrite chain, then
/// emission. Returns `Err` carrying the diagnostics of whichever validation
/// stage first rejected the program; rewrites never fail on validated input.
pub fn compile(mut program: Program) -> Result<CompileReport, CodegenError> {
    validate(&mut program)?;
    let warnings = rewrite(&mut program);
    let ir = xor::emit(&program);
    Ok(CompileReport { ir, warnings })
}

/// Like [`compile`], but also returns a `Display` snapshot of `main` taken
/// after every pass, mirroring `compile_program_with_prints`'s behavior of
/// printing the program's `readable_str()` between stages.
pub fn compile_with_trace(mut program: Program) -> Result<(CompileReport, Vec<TraceStep>), CodegenError> {
    validate(&mut program)?;
    let mut trace = Vec::new();
    let mut snapshot = |pass: &'static str, program: &Program| {
        trace.push(TraceStep {
            pass,
            program: program.to_string(),
        });
    };

    remove_uminus(&mut program);
    snapshot("remove_uminus", &program);
    rewrite_eq(&mut program);
    snapshot("rewrite_eq", &program);
    RedefRenamer::new().rename_redefinitions(&mut program);
    snapshot("rename_redefinitions", &program);
    let mut warnings = smart_inline_program(&mut program);
    snapshot("smart_inline", &program);
    IfLowering::new().lower(&mut program);
    snapshot("if_lowering", &program);
    TmpInserter::new().insert(&mut program);
    snapshot("insert_tmps", &program);
    warnings.extend(ConstProp::new().run(&mut program));
    snapshot("constant_propagation", &program);
    xor::specialize(&mut program);
    snapshot("xor_specialization", &program);

    let ir = xor::emit(&program);
    Ok((CompileReport { ir, warnings }, trace))
}

/// §4.1/§4.2/§4.3: every check that can reject a program, in the order
/// `Compiler.py::compile_program` runs them.
fn validate(program: &mut Program) -> Result<(), CodegenError> {
    reject_if_any(check_main(program))?;
    reject_if_any(check_illegal_io(program))?;
    if check_recursion(program)? {
        return Err(CodegenError::RecursionOrOverload);
    }
    reject_if_any(check_bad_func_calls(program))?;
    let (has_undeclared, diags) = check_undeclared_var(program);
    if has_undeclared {
        return Err(CodegenError::Invalid { diagnostics: diags });
    }
    let (io_names_ok, diags) = check_io_names(program);
    if !io_names_ok {
        return Err(CodegenError::Invalid { diagnostics: diags });
    }
    let (well_typed, diags) = type_check_bool_num(program, false);
    if !well_typed {
        return Err(CodegenError::Invalid { diagnostics: diags });
    }
    Ok(())
}

/// §4.4–§4.11: the rewrite chain, assumed total on a validated program.
/// Returns every warning collected by smart inlining (leak-in-secret-branch)
/// and constant propagation (constant output).
fn rewrite(program: &mut Program) -> Vec<Warning> {
    remove_uminus(program);
    rewrite_eq(program);
    RedefRenamer::new().rename_redefinitions(program);
    let mut warnings = smart_inline_program(program);
    IfLowering::new().lower(program);
    TmpInserter::new().insert(program);
    warnings.extend(ConstProp::new().run(program));
    xor::specialize(program);
    warnings
}
