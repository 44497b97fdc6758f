//! The five semantic validation passes of §4.2, grounded on
//! `ASTmanipulations.py`'s `check_*` methods.

use std::collections::HashSet;

use mpcc_ast::{Expr, ExprKind, Program, StmtKind};

use crate::diagnostic::Diagnostic;

const BUILTINS: [&str; 2] = ["randomnum", "randombit"];

/// `check_main`: stops at the first `main` with parameters, mirroring the
/// original's early `return False` rather than scanning every function.
pub fn check_main(prog: &Program) -> Vec<Diagnostic> {
    let mut found_main = false;
    for func in &prog.functions {
        if func.name == "main" {
            if !func.params.is_empty() {
                return vec![Diagnostic::MainHasParams {
                    line: func.line.unwrap_or(0),
                }];
            }
            found_main = true;
        }
    }
    if !found_main {
        return vec![Diagnostic::NoMain];
    }
    vec![]
}

pub fn check_illegal_io(prog: &Program) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for func in &prog.functions {
        if func.is_main() {
            continue;
        }
        for stmt in &func.body.stmts {
            match &stmt.kind {
                StmtKind::Input { .. } => diags.push(Diagnostic::IllegalInput {
                    line: stmt.line.unwrap_or(0),
                    stmt: stmt.to_string(),
                    func: func.name.clone(),
                }),
                StmtKind::Output { .. } => diags.push(Diagnostic::IllegalOutput {
                    line: stmt.line.unwrap_or(0),
                    stmt: stmt.to_string(),
                    func: func.name.clone(),
                }),
                _ => {}
            }
        }
    }
    diags
}

/// `check_bad_func_calls`: arity only, never argument values. Preserves the
/// `If` bug verbatim -- the then-branch is inspected twice, the else-branch
/// never.
pub fn check_bad_func_calls(prog: &Program) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for func in &prog.functions {
        for stmt in &func.body.stmts {
            if let StmtKind::Assign { expr, .. } = &stmt.kind {
                expr_bad_func_calls(expr, prog, &mut diags);
            }
        }
        if !func.is_main() {
            if let Some(tail) = &func.body.tail {
                expr_bad_func_calls(tail, prog, &mut diags);
            }
        }
    }
    diags
}

fn expr_bad_func_calls(expr: &Expr, prog: &Program, diags: &mut Vec<Diagnostic>) {
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => {}
        ExprKind::If(c, t, _e) => {
            expr_bad_func_calls(c, prog, diags);
            expr_bad_func_calls(t, prog, diags);
            expr_bad_func_calls(t, prog, diags);
        }
        ExprKind::Uminus(e) | ExprKind::Not(e) | ExprKind::Leak(e) => {
            expr_bad_func_calls(e, prog, diags)
        }
        ExprKind::Binop(_, l, r) => {
            expr_bad_func_calls(l, prog, diags);
            expr_bad_func_calls(r, prog, diags);
        }
        ExprKind::FuncCall(name, args) => {
            if BUILTINS.contains(&name.as_str()) {
                return;
            }
            let callee = prog
                .find(name)
                .expect("undeclared callees are rejected before this check runs");
            if args.len() != callee.params.len() {
                diags.push(Diagnostic::ArityMismatch {
                    line: expr.line.unwrap_or(0),
                    name: name.clone(),
                    supplied: args.len(),
                    expected: callee.params.len(),
                });
            }
        }
        ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
            unreachable!("runs before if-lowering introduces these")
        }
    }
}

/// `check_undeclared_var`. Returns the aggregate boolean exactly as the
/// original computes it (including the `FuncCall` argument-list bug where
/// only the *last* argument's result decides the call's contribution) plus
/// every diagnostic actually printed along the way -- the two can diverge:
/// a program can have an undeclared-variable diagnostic yet `ok == true`
/// if it is masked by a later sound argument in the same call.
pub fn check_undeclared_var(prog: &Program) -> (bool, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let mut any = false;
    for func in &prog.functions {
        let mut declared: HashSet<String> = func.params.iter().cloned().collect();
        for stmt in &func.body.stmts {
            match &stmt.kind {
                StmtKind::Input { var, .. } => {
                    declared.insert(var.clone());
                }
                StmtKind::Output { value, .. } => {
                    if let ExprKind::Identifier(name) = &value.kind {
                        if !declared.contains(name) {
                            any = true;
                            diags.push(Diagnostic::UndeclaredVar {
                                line: stmt.line.unwrap_or(0),
                                name: name.clone(),
                            });
                        }
                    }
                }
                StmtKind::Assign { var, expr, .. } => {
                    if expr_uses_undeclared_var(expr, &declared, &mut diags) {
                        any = true;
                    }
                    declared.insert(var.clone());
                }
                StmtKind::JumpIfFalse { .. } | StmtKind::Jump { .. } | StmtKind::ProgramPoint(_) => {
                    unreachable!("runs before if-lowering")
                }
            }
        }
        if !func.is_main() {
            if let Some(tail) = &func.body.tail {
                if expr_uses_undeclared_var(tail, &declared, &mut diags) {
                    any = true;
                }
            }
        }
    }
    (any, diags)
}

fn expr_uses_undeclared_var(expr: &Expr, declared: &HashSet<String>, diags: &mut Vec<Diagnostic>) -> bool {
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Boolean(_) => false,
        ExprKind::Identifier(name) => {
            if declared.contains(name) {
                false
            } else {
                diags.push(Diagnostic::UndeclaredVar {
                    line: expr.line.unwrap_or(0),
                    name: name.clone(),
                });
                true
            }
        }
        ExprKind::Uminus(e) | ExprKind::Not(e) | ExprKind::Leak(e) => {
            expr_uses_undeclared_var(e, declared, diags)
        }
        ExprKind::Binop(_, l, r) => {
            expr_uses_undeclared_var(l, declared, diags) || expr_uses_undeclared_var(r, declared, diags)
        }
        ExprKind::If(c, t, e) => {
            expr_uses_undeclared_var(c, declared, diags)
                || expr_uses_undeclared_var(t, declared, diags)
                || expr_uses_undeclared_var(e, declared, diags)
        }
        ExprKind::FuncCall(_, args) => {
            let mut undeclared_use = false;
            for arg in args {
                undeclared_use = expr_uses_undeclared_var(arg, declared, diags);
            }
            undeclared_use
        }
        ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
            unreachable!("runs before if-lowering introduces these")
        }
    }
}

/// `check_io_names`: `main`'s input names and output labels are each
/// checked for uniqueness against their own set only.
pub fn check_io_names(prog: &Program) -> (bool, Vec<Diagnostic>) {
    let main = prog.main();
    let mut output_names = HashSet::new();
    let mut input_names = HashSet::new();
    let mut diags = Vec::new();
    let mut distinct_outputs = true;
    let mut distinct_inputs = true;
    for stmt in &main.body.stmts {
        match &stmt.kind {
            StmtKind::Output { label, .. } => {
                if !output_names.insert(label.clone()) {
                    distinct_outputs = false;
                    diags.push(Diagnostic::DuplicateOutputName {
                        line: stmt.line.unwrap_or(0),
                        name: label.clone(),
                    });
                }
            }
            StmtKind::Input { var, .. } => {
                if !input_names.insert(var.clone()) {
                    distinct_inputs = false;
                    diags.push(Diagnostic::DuplicateInputName {
                        line: stmt.line.unwrap_or(0),
                        name: var.clone(),
                    });
                }
            }
            _ => {}
        }
    }
    (distinct_outputs && distinct_inputs, diags)
}
