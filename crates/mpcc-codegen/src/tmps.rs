//! §4.9: temp insertion, grounded on `ASTmanipulations.py`'s `insert_tmps`/
//! `expr_insert_tmps`.
//!
//! Hoists every non-atomic operand of a top-level `Binop`/`Not`/`Leak`
//! assignment into a fresh `_tmp{N}` identifier, so that after this pass
//! every such operand is a literal or identifier. Separately, a bare read of
//! `_randomnum`/`_randombit` is hoisted into its own temp even though it is
//! already atomic -- this one is named `tmp{N}`, with no leading underscore,
//! reproducing a genuine naming inconsistency in the original rather than
//! normalizing it away.

use mpcc_ast::{Expr, ExprKind, Program, Stmt, StmtKind};

pub struct TmpInserter {
    tmp_counter: u32,
}

impl TmpInserter {
    pub fn new() -> Self {
        TmpInserter { tmp_counter: 1 }
    }

    pub fn insert(&mut self, prog: &mut Program) {
        let main = prog.main_mut();
        let mut new_stmts = Vec::new();
        for stmt in std::mem::take(&mut main.body.stmts) {
            match stmt.kind {
                StmtKind::Assign { var, expr, is_if_result_assign } => {
                    let rewritten = match expr.kind {
                        ExprKind::Binop(op, l, r) => {
                            let line = expr.line;
                            let l = self.hoist(*l, &mut new_stmts);
                            let r = self.hoist(*r, &mut new_stmts);
                            ExprKind::Binop(op, Box::new(l), Box::new(r)).at(line)
                        }
                        ExprKind::Not(sub) => {
                            let line = expr.line;
                            let sub = self.hoist(*sub, &mut new_stmts);
                            ExprKind::Not(Box::new(sub)).at(line)
                        }
                        ExprKind::Leak(sub) => {
                            let line = expr.line;
                            let sub = self.hoist(*sub, &mut new_stmts);
                            ExprKind::Leak(Box::new(sub)).at(line)
                        }
                        other => other.at(expr.line),
                    };
                    new_stmts.push(Stmt::new(
                        StmtKind::Assign { var, expr: rewritten, is_if_result_assign },
                        stmt.line,
                    ));
                }
                other => new_stmts.push(Stmt::new(other, stmt.line)),
            }
        }
        main.body.stmts = new_stmts;
    }

    /// Folds `expr` down to an atomic operand, emitting whatever temp
    /// assignments are needed along the way into `stmts`.
    fn hoist(&mut self, expr: Expr, stmts: &mut Vec<Stmt>) -> Expr {
        let line = expr.line;
        match expr.kind {
            ExprKind::Number(_) | ExprKind::Boolean(_) => expr,
            ExprKind::Identifier(name) | ExprKind::IfResultId(name) => {
                if name == "_randomnum" || name == "_randombit" {
                    let tmp_var = format!("tmp{}", self.tmp_counter);
                    self.tmp_counter += 1;
                    stmts.push(Stmt::assign(tmp_var.clone(), ExprKind::Identifier(name).at(line), line));
                    Expr::ident(tmp_var, None)
                } else {
                    ExprKind::Identifier(name).at(line)
                }
            }
            ExprKind::Leak(sub) => {
                let sub = self.hoist(*sub, stmts);
                self.push_tmp(ExprKind::Leak(Box::new(sub)).at(line), stmts)
            }
            ExprKind::Not(sub) => {
                let sub = self.hoist(*sub, stmts);
                self.push_tmp(ExprKind::Not(Box::new(sub)).at(line), stmts)
            }
            ExprKind::Binop(op, l, r) => {
                let l = self.hoist(*l, stmts);
                let r = self.hoist(*r, stmts);
                self.push_tmp(ExprKind::Binop(op, Box::new(l), Box::new(r)).at(line), stmts)
            }
            ExprKind::If(..) | ExprKind::FuncCall(..) | ExprKind::Uminus(_) | ExprKind::Seq(..) => {
                unreachable!("if-lowering, smart inlining, and uminus removal already ran")
            }
        }
    }

    fn push_tmp(&mut self, expr: Expr, stmts: &mut Vec<Stmt>) -> Expr {
        let line = expr.line;
        let tmp_var = format!("_tmp{}", self.tmp_counter);
        self.tmp_counter += 1;
        stmts.push(Stmt::assign(tmp_var.clone(), expr, line));
        Expr::ident(tmp_var, None)
    }
}

impl Default for TmpInserter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{BinOp, Function, FunctionBody};

    #[test]
    fn nested_binop_operands_get_hoisted_to_temps() {
        let inner = ExprKind::Binop(BinOp::Add, Box::new(Expr::number(1)), Box::new(Expr::number(2))).synthetic();
        let outer = ExprKind::Binop(BinOp::Mul, Box::new(inner), Box::new(Expr::number(3))).synthetic();
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("y", outer, None)], None),
            None,
        )]);
        TmpInserter::new().insert(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0].kind, StmtKind::Assign { var, .. } if var == "_tmp1"));
        assert!(matches!(&stmts[1].kind, StmtKind::Assign { var, .. } if var == "y"));
    }

    #[test]
    fn bare_randomness_read_is_hoisted_without_leading_underscore() {
        let expr = ExprKind::Binop(
            BinOp::Add,
            Box::new(Expr::ident("_randomnum", None)),
            Box::new(Expr::number(1)),
        )
        .synthetic();
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("y", expr, None)], None),
            None,
        )]);
        TmpInserter::new().insert(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert!(matches!(&stmts[0].kind, StmtKind::Assign { var, .. } if var == "tmp1"));
    }

    #[test]
    fn atomic_rhs_is_left_untouched() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("y", Expr::ident("x", None), None)], None),
            None,
        )]);
        TmpInserter::new().insert(&mut prog);
        assert_eq!(prog.main().body.stmts.len(), 1);
    }
}
