//! §4.4–§4.6: uminus removal, equality rewrite, and redefinition renaming.
//! Grounded on `ASTmanipulations.py`'s `rewrite_uminus`/`rewrite_eq`/
//! `change_reused_var_names`.

use std::collections::HashMap;

use mpcc_ast::{BinOp, Expr, ExprKind, Program, Stmt, StmtKind};

fn take(e: &mut Expr) -> Expr {
    std::mem::replace(e, Expr::synthetic(ExprKind::Number(0)))
}

/// `x = -y;` becomes `x = 0 - y;`, recursively, everywhere.
pub fn remove_uminus(prog: &mut Program) {
    for func in &mut prog.functions {
        for stmt in &mut func.body.stmts {
            if let StmtKind::Assign { expr, .. } = &mut stmt.kind {
                let old = take(expr);
                *expr = remove_uminus_expr(old);
            }
        }
        if !func.is_main() {
            if let Some(tail) = &mut func.body.tail {
                let old = take(tail);
                *tail = remove_uminus_expr(old);
            }
        }
    }
}

fn remove_uminus_expr(expr: Expr) -> Expr {
    let line = expr.line;
    match expr.kind {
        ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => expr,
        ExprKind::Not(mut sub) => {
            *sub = remove_uminus_expr(take(&mut sub));
            ExprKind::Not(sub).at(line)
        }
        ExprKind::Leak(mut sub) => {
            *sub = remove_uminus_expr(take(&mut sub));
            ExprKind::Leak(sub).at(line)
        }
        ExprKind::Binop(op, mut l, mut r) => {
            *l = remove_uminus_expr(take(&mut l));
            *r = remove_uminus_expr(take(&mut r));
            ExprKind::Binop(op, l, r).at(line)
        }
        ExprKind::If(mut c, mut t, mut e) => {
            *c = remove_uminus_expr(take(&mut c));
            *t = remove_uminus_expr(take(&mut t));
            *e = remove_uminus_expr(take(&mut e));
            ExprKind::If(c, t, e).at(line)
        }
        ExprKind::FuncCall(name, args) => {
            let args = args.into_iter().map(remove_uminus_expr).collect();
            ExprKind::FuncCall(name, args).at(line)
        }
        ExprKind::Uminus(mut sub) => {
            *sub = remove_uminus_expr(take(&mut sub));
            ExprKind::Binop(BinOp::Sub, Box::new(ExprKind::Number(0).at(line)), sub).at(line)
        }
        ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
            unreachable!("uminus removal runs before if-lowering introduces these")
        }
    }
}

/// `a == b` becomes `!(a != b)`.
pub fn rewrite_eq(prog: &mut Program) {
    for func in &mut prog.functions {
        for stmt in &mut func.body.stmts {
            if let StmtKind::Assign { expr, .. } = &mut stmt.kind {
                let old = take(expr);
                *expr = rewrite_eq_expr(old);
            }
        }
        if !func.is_main() {
            if let Some(tail) = &mut func.body.tail {
                let old = take(tail);
                *tail = rewrite_eq_expr(old);
            }
        }
    }
}

fn rewrite_eq_expr(expr: Expr) -> Expr {
    let line = expr.line;
    match expr.kind {
        ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => expr,
        ExprKind::Not(mut sub) => {
            *sub = rewrite_eq_expr(take(&mut sub));
            ExprKind::Not(sub).at(line)
        }
        ExprKind::Leak(mut sub) => {
            *sub = rewrite_eq_expr(take(&mut sub));
            ExprKind::Leak(sub).at(line)
        }
        ExprKind::FuncCall(name, args) => {
            let args = args.into_iter().map(rewrite_eq_expr).collect();
            ExprKind::FuncCall(name, args).at(line)
        }
        ExprKind::If(mut c, mut t, mut e) => {
            *c = rewrite_eq_expr(take(&mut c));
            *t = rewrite_eq_expr(take(&mut t));
            *e = rewrite_eq_expr(take(&mut e));
            ExprKind::If(c, t, e).at(line)
        }
        ExprKind::Binop(op, mut l, mut r) => {
            *l = rewrite_eq_expr(take(&mut l));
            *r = rewrite_eq_expr(take(&mut r));
            if op == BinOp::Eq {
                let neq = ExprKind::Binop(BinOp::Neq, l, r).at(line);
                ExprKind::Not(Box::new(neq)).at(line)
            } else {
                ExprKind::Binop(op, l, r).at(line)
            }
        }
        ExprKind::Uminus(_) => unreachable!("uminus removal runs before this pass"),
        ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
            unreachable!("equality rewrite runs before if-lowering introduces these")
        }
    }
}

/// §4.6: renames a variable on redefinition to a fresh `_v_<k>` name, so
/// every assignment target in a function body is unique.
pub struct RedefRenamer {
    counter: u32,
}

impl RedefRenamer {
    pub fn new() -> Self {
        RedefRenamer { counter: 1 }
    }

    pub fn rename_redefinitions(&mut self, prog: &mut Program) {
        for func in &mut prog.functions {
            let mut current_name: HashMap<String, String> = HashMap::new();
            if func.is_main() {
                for stmt in &func.body.stmts {
                    if let StmtKind::Input { var, .. } = &stmt.kind {
                        current_name.insert(var.clone(), var.clone());
                    }
                }
            }
            for param in &func.params {
                current_name.insert(param.clone(), param.clone());
            }
            for stmt in &mut func.body.stmts {
                self.rename_stmt(stmt, &mut current_name);
            }
            if !func.is_main() {
                if let Some(tail) = &mut func.body.tail {
                    rename_refs(tail, &current_name);
                }
            }
        }
    }

    fn rename_stmt(&mut self, stmt: &mut Stmt, current_name: &mut HashMap<String, String>) {
        match &mut stmt.kind {
            StmtKind::Input { var, .. } => {
                current_name.insert(var.clone(), var.clone());
            }
            StmtKind::Output { value, .. } => {
                rename_refs(value, current_name);
            }
            StmtKind::Assign { var, expr, .. } => {
                rename_refs(expr, current_name);
                if current_name.contains_key(var) {
                    let fresh = format!("_{var}_{}", self.counter);
                    self.counter += 1;
                    current_name.insert(var.clone(), fresh.clone());
                    *var = fresh;
                } else {
                    current_name.insert(var.clone(), var.clone());
                }
            }
            StmtKind::JumpIfFalse { .. } | StmtKind::Jump { .. } | StmtKind::ProgramPoint(_) => {
                unreachable!("redefinition renaming runs before if-lowering")
            }
        }
    }
}

impl Default for RedefRenamer {
    fn default() -> Self {
        Self::new()
    }
}

fn rename_refs(expr: &mut Expr, current_name: &HashMap<String, String>) {
    match &mut expr.kind {
        ExprKind::Identifier(name) => {
            if let Some(latest) = current_name.get(name) {
                *name = latest.clone();
            }
        }
        ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::IfResultId(_) => {}
        ExprKind::Not(sub) | ExprKind::Leak(sub) | ExprKind::Uminus(sub) => {
            rename_refs(sub, current_name)
        }
        ExprKind::Binop(_, l, r) => {
            rename_refs(l, current_name);
            rename_refs(r, current_name);
        }
        ExprKind::If(c, t, e) => {
            rename_refs(c, current_name);
            rename_refs(t, current_name);
            rename_refs(e, current_name);
        }
        ExprKind::FuncCall(_, args) => {
            for arg in args {
                rename_refs(arg, current_name);
            }
        }
        ExprKind::Seq(..) => unreachable!("redefinition renaming runs before if-lowering"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{Function, FunctionBody};

    #[test]
    fn uminus_becomes_zero_minus_subexpr() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![Stmt::assign("y", ExprKind::Uminus(Box::new(Expr::ident("x", None))).synthetic(), None)],
                None,
            ),
            None,
        )]);
        remove_uminus(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[0].kind else { panic!() };
        match &expr.kind {
            ExprKind::Binop(BinOp::Sub, l, r) => {
                assert!(matches!(l.kind, ExprKind::Number(0)));
                assert!(matches!(r.kind, ExprKind::Identifier(_)));
            }
            other => panic!("expected Binop(Sub, 0, x), got {other:?}"),
        }
    }

    #[test]
    fn equality_becomes_negated_inequality() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![Stmt::assign(
                    "y",
                    ExprKind::Binop(BinOp::Eq, Box::new(Expr::number(1)), Box::new(Expr::number(2))).synthetic(),
                    None,
                )],
                None,
            ),
            None,
        )]);
        rewrite_eq(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[0].kind else { panic!() };
        match &expr.kind {
            ExprKind::Not(inner) => assert!(matches!(inner.kind, ExprKind::Binop(BinOp::Neq, _, _))),
            other => panic!("expected Not(Binop(Neq, ..)), got {other:?}"),
        }
    }

    #[test]
    fn redefinition_gets_a_fresh_name() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::assign("x", Expr::number(1), None),
                    Stmt::assign("x", Expr::number(2), None),
                    Stmt::assign("y", Expr::ident("x", None), None),
                ],
                None,
            ),
            None,
        )]);
        RedefRenamer::new().rename_redefinitions(&mut prog);
        let stmts = &prog.main().body.stmts;
        let StmtKind::Assign { var, .. } = &stmts[1].kind else { panic!() };
        assert_eq!(var, "_x_1");
        let StmtKind::Assign { expr, .. } = &stmts[2].kind else { panic!() };
        assert!(matches!(&expr.kind, ExprKind::Identifier(n) if n == "_x_1"));
    }

    #[test]
    fn input_names_are_preseeded_and_never_renamed() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![Stmt::new(
                    StmtKind::Input { var: "x".into(), provider: 1, ty: mpcc_ast::Type::Num },
                    None,
                )],
                None,
            ),
            None,
        )]);
        RedefRenamer::new().rename_redefinitions(&mut prog);
        let StmtKind::Input { var, .. } = &prog.main().body.stmts[0].kind else { panic!() };
        assert_eq!(var, "x");
    }
}
