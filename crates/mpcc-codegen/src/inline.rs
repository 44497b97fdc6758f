//! §4.7: whole-program smart inlining into a single `main`, threading the
//! publicness analysis. Grounded on `ASTmanipulations.py`'s
//! `smart_inline_program`/`func_smart_inline`/`expr_smart_inline`/
//! `rename_all_vars`.

use indexmap::IndexMap;

use mpcc_ast::{Expr, ExprKind, Function, FunctionBody, Program, Stmt, StmtKind};

use crate::warning::Warning;

fn public(mut e: Expr, is_public: bool) -> Expr {
    e.is_public = Some(is_public);
    e
}

const BUILTINS: [&str; 2] = ["randomnum", "randombit"];

struct Inliner {
    func_dict: std::collections::HashMap<String, Function>,
    func_call_counter: u32,
    private_cond_depth: u32,
    warnings: Vec<Warning>,
}

/// Inlines every call reachable from `main`, leaving `prog` a single `main`
/// function with no user function calls. Returns leak-in-secret-branch
/// warnings collected along the way.
pub fn smart_inline_program(prog: &mut Program) -> Vec<Warning> {
    let func_dict = prog
        .functions
        .iter()
        .map(|f| (f.name.clone(), f.clone()))
        .collect();
    let mut inliner = Inliner {
        func_dict,
        func_call_counter: 1,
        private_cond_depth: 0,
        warnings: Vec::new(),
    };
    let body = inliner.func_smart_inline("main", IndexMap::new());
    *prog = Program::new(vec![Function::new("main", vec![], body, None)]);
    inliner.warnings
}

impl Inliner {
    /// `var_values` maps each in-scope (already-renamed) identifier to the
    /// expression bound to it -- used only to read off publicness, and, for
    /// callee parameters, re-materialized as a leading assignment so the
    /// callee body can keep referring to it by name.
    fn func_smart_inline(&mut self, func_name: &str, mut var_values: IndexMap<String, Expr>) -> FunctionBody {
        let mut func = self.func_dict[func_name].clone();
        if func_name != "main" {
            self.rename_all_vars(&mut func);
        }

        let arg_assignments: Vec<Stmt> = var_values
            .iter()
            .map(|(k, v)| Stmt::assign(k.clone(), v.clone(), None))
            .collect();

        let mut stmts = Vec::new();
        for mut stmt in func.body.stmts {
            match &mut stmt.kind {
                StmtKind::Input { var, .. } => {
                    var_values.insert(var.clone(), public(Expr::ident(var.clone(), None), false));
                    stmts.push(stmt);
                }
                StmtKind::Assign { var, expr, .. } => {
                    let inlined = self.expr_smart_inline(std::mem::replace(expr, Expr::number(0)), &var_values);
                    var_values.insert(var.clone(), inlined.clone());
                    *expr = inlined;
                    stmts.push(stmt);
                }
                StmtKind::Output { .. } => stmts.push(stmt),
                StmtKind::JumpIfFalse { .. } | StmtKind::Jump { .. } | StmtKind::ProgramPoint(_) => {
                    unreachable!("smart inlining runs before if-lowering")
                }
            }
        }

        let mut all_stmts = arg_assignments;
        all_stmts.extend(stmts);

        let tail = if func_name != "main" {
            func.body.tail.map(|e| self.expr_smart_inline(e, &var_values))
        } else {
            None
        };
        FunctionBody::new(all_stmts, tail)
    }

    fn expr_smart_inline(&mut self, expr: Expr, var_values: &IndexMap<String, Expr>) -> Expr {
        let line = expr.line;
        match expr.kind {
            ExprKind::Number(n) => public(ExprKind::Number(n).at(line), true),
            ExprKind::Boolean(b) => public(ExprKind::Boolean(b).at(line), true),
            ExprKind::Identifier(name) => {
                let is_pub = var_values
                    .get(&name)
                    .map(|v| v.is_public())
                    .unwrap_or(false);
                public(ExprKind::Identifier(name).at(line), is_pub)
            }
            ExprKind::Leak(sub) => {
                let sub = self.expr_smart_inline(*sub, var_values);
                if self.private_cond_depth > 0 {
                    self.warnings.push(Warning::LeakInSecretBranch {
                        line: line.unwrap_or(0),
                    });
                }
                public(ExprKind::Leak(Box::new(sub)).at(line), true)
            }
            ExprKind::Not(sub) => {
                let sub = self.expr_smart_inline(*sub, var_values);
                let is_pub = sub.is_public();
                public(ExprKind::Not(Box::new(sub)).at(line), is_pub)
            }
            ExprKind::Binop(op, l, r) => {
                let l = self.expr_smart_inline(*l, var_values);
                let r = self.expr_smart_inline(*r, var_values);
                let is_pub = l.is_public() && r.is_public();
                public(ExprKind::Binop(op, Box::new(l), Box::new(r)).at(line), is_pub)
            }
            ExprKind::If(c, t, e) => {
                let c = self.expr_smart_inline(*c, var_values);
                let is_pub = c.is_public();
                if !is_pub {
                    self.private_cond_depth += 1;
                }
                let t = self.expr_smart_inline(*t, var_values);
                let e = self.expr_smart_inline(*e, var_values);
                if !is_pub {
                    self.private_cond_depth -= 1;
                }
                public(ExprKind::If(Box::new(c), Box::new(t), Box::new(e)).at(line), is_pub)
            }
            ExprKind::FuncCall(name, args) => {
                if BUILTINS.contains(&name.as_str()) {
                    return public(ExprKind::Identifier(format!("_{name}")).at(line), false);
                }
                let args: Vec<Expr> = args
                    .into_iter()
                    .map(|a| self.expr_smart_inline(a, var_values))
                    .collect();
                let callee = self.func_dict[&name].clone();
                let mut arg_values = IndexMap::new();
                for (param, caller_arg) in callee.params.iter().zip(args.into_iter()) {
                    let renamed = format!("_{}_{}_{}", name, self.func_call_counter, param);
                    arg_values.insert(renamed, caller_arg);
                }
                let body = self.func_smart_inline(&name, arg_values);
                let tail = body.tail.expect("non-main callee has a trailing expression");
                let is_pub = tail.is_public();
                public(ExprKind::Seq(body.stmts, Box::new(tail)).at(line), is_pub)
            }
            ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
                unreachable!("smart inlining runs before if-lowering introduces these")
            }
            ExprKind::Uminus(_) => unreachable!("uminus removal runs before this pass"),
        }
    }

    /// Deep-copies and renames every local of a non-`main` callee to
    /// `_<func>_<call-site-counter>_<original-name>`, preventing capture.
    fn rename_all_vars(&mut self, func: &mut Function) {
        for stmt in &mut func.body.stmts {
            match &mut stmt.kind {
                StmtKind::Input { var, .. } => *var = self.renamed(&func.name, var),
                StmtKind::Output { value, .. } => self.rename_vars(value, &func.name),
                StmtKind::Assign { var, expr, .. } => {
                    *var = self.renamed(&func.name, var);
                    self.rename_vars(expr, &func.name);
                }
                StmtKind::JumpIfFalse { .. } | StmtKind::Jump { .. } | StmtKind::ProgramPoint(_) => {
                    unreachable!("smart inlining runs before if-lowering")
                }
            }
        }
        func.params = func
            .params
            .iter()
            .map(|p| self.renamed(&func.name, p))
            .collect();
        if let Some(tail) = &mut func.body.tail {
            self.rename_vars(tail, &func.name);
        }
        self.func_call_counter += 1;
    }

    fn renamed(&self, func_name: &str, name: &str) -> String {
        format!("_{}_{}_{}", func_name, self.func_call_counter, name)
    }

    fn rename_vars(&self, expr: &mut Expr, func_name: &str) {
        match &mut expr.kind {
            ExprKind::Identifier(name) => *name = self.renamed(func_name, name),
            ExprKind::Not(sub) | ExprKind::Leak(sub) | ExprKind::Uminus(sub) => {
                self.rename_vars(sub, func_name)
            }
            ExprKind::Binop(_, l, r) => {
                self.rename_vars(l, func_name);
                self.rename_vars(r, func_name);
            }
            ExprKind::FuncCall(_, args) => {
                for arg in args {
                    self.rename_vars(arg, func_name);
                }
            }
            ExprKind::If(c, t, e) => {
                self.rename_vars(c, func_name);
                self.rename_vars(t, func_name);
                self.rename_vars(e, func_name);
            }
            ExprKind::Number(_) | ExprKind::Boolean(_) => {}
            ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
                unreachable!("smart inlining runs before if-lowering introduces these")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{FunctionBody, Type};

    fn prog_calling_f() -> Program {
        Program::new(vec![
            Function::new(
                "main",
                vec![],
                FunctionBody::new(
                    vec![Stmt::assign(
                        "z",
                        ExprKind::FuncCall("f".into(), vec![Expr::number(3)]).synthetic(),
                        None,
                    )],
                    None,
                ),
                None,
            ),
            Function::new(
                "f",
                vec!["a".into()],
                FunctionBody::new(
                    vec![],
                    Some(
                        ExprKind::Binop(mpcc_ast::BinOp::Add, Box::new(Expr::ident("a", None)), Box::new(Expr::number(1)))
                            .synthetic(),
                    ),
                ),
                None,
            ),
        ])
    }

    #[test]
    fn inlining_leaves_a_single_main_with_no_calls() {
        let mut prog = prog_calling_f();
        smart_inline_program(&mut prog);
        assert_eq!(prog.functions.len(), 1);
        assert_eq!(prog.functions[0].name, "main");
    }

    #[test]
    fn input_bound_identifier_is_secret() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::new(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Num }, None),
                    Stmt::assign("y", Expr::ident("x", None), None),
                ],
                None,
            ),
            None,
        )]);
        smart_inline_program(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[1].kind else { panic!() };
        assert!(!expr.is_public());
    }

    #[test]
    fn literal_is_public() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("y", Expr::number(1), None)], None),
            None,
        )]);
        smart_inline_program(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[0].kind else { panic!() };
        assert!(expr.is_public());
    }
}
