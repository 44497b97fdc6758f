//! §4.8: if-lowering and flattening of inlined call bodies, grounded on
//! `ASTmanipulations.py`'s `rewrite_ifs_and_remove_body_exprs`.
//!
//! Public conditions lower to `JZ`/two `ProgramPoint`s/`JMP`, computing only
//! the chosen branch. Secret conditions lower to the branchless multiplexer
//! `cond * then + (1 - cond) * else`, computing both branches unconditionally
//! so the control flow never depends on a secret value. `Seq` nodes left
//! behind by smart inlining (§4.7) are flattened into the surrounding
//! statement stream here, the same point the original flattens inlined
//! `FunctionBody` expressions.

use mpcc_ast::{BinOp, Expr, ExprKind, Program, Stmt, StmtKind};

pub struct IfLowering {
    tmp_counter: u32,
    program_point_counter: u32,
}

impl IfLowering {
    pub fn new() -> Self {
        IfLowering {
            tmp_counter: 1,
            program_point_counter: 1,
        }
    }

    pub fn lower(&mut self, prog: &mut Program) {
        let main = prog.main_mut();
        let mut new_stmts = Vec::new();
        for stmt in std::mem::take(&mut main.body.stmts) {
            self.stmt(stmt, &mut new_stmts);
        }
        main.body.stmts = new_stmts;
    }

    fn stmt(&mut self, stmt: Stmt, stmts: &mut Vec<Stmt>) {
        let line = stmt.line;
        match stmt.kind {
            StmtKind::Assign { var, expr, is_if_result_assign } => {
                let result = self.expr(expr, stmts);
                stmts.push(Stmt::new(
                    StmtKind::Assign { var, expr: result, is_if_result_assign },
                    line,
                ));
            }
            other => stmts.push(Stmt::new(other, line)),
        }
    }

    fn fresh_tmp(&mut self) -> String {
        let name = format!("_tmp{}", self.tmp_counter);
        self.tmp_counter += 1;
        name
    }

    fn expr(&mut self, expr: Expr, stmts: &mut Vec<Stmt>) -> Expr {
        let line = expr.line;
        match expr.kind {
            ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => expr,
            ExprKind::Not(sub) => {
                let sub = self.expr(*sub, stmts);
                ExprKind::Not(Box::new(sub)).at(line)
            }
            ExprKind::Leak(sub) => {
                let sub = self.expr(*sub, stmts);
                ExprKind::Leak(Box::new(sub)).at(line)
            }
            ExprKind::Binop(op, l, r) => {
                let l = self.expr(*l, stmts);
                let r = self.expr(*r, stmts);
                ExprKind::Binop(op, Box::new(l), Box::new(r)).at(line)
            }
            ExprKind::Seq(inner_stmts, tail) => {
                for inner in inner_stmts {
                    self.stmt(inner, stmts);
                }
                self.expr(*tail, stmts)
            }
            ExprKind::If(cond, then_branch, else_branch) => {
                let is_public = cond.is_public();
                let cond = self.expr(*cond, stmts);
                let cond_var = self.fresh_tmp();
                stmts.push(Stmt::assign(cond_var.clone(), cond, line));

                if !is_public {
                    let then_val = self.expr(*then_branch, stmts);
                    let else_val = self.expr(*else_branch, stmts);

                    let left = ExprKind::Binop(
                        BinOp::Mul,
                        Box::new(Expr::ident(cond_var.clone(), None)),
                        Box::new(then_val),
                    )
                    .at(line);
                    let complement = ExprKind::Binop(
                        BinOp::Sub,
                        Box::new(Expr::number(1)),
                        Box::new(Expr::ident(cond_var, None)),
                    )
                    .at(line);
                    let right = ExprKind::Binop(BinOp::Mul, Box::new(complement), Box::new(else_val)).at(line);
                    return ExprKind::Binop(BinOp::Add, Box::new(left), Box::new(right)).at(line);
                }

                let result_var = self.fresh_tmp();
                let point_before_else = self.program_point_counter;
                let exit_point = self.program_point_counter + 1;
                self.program_point_counter += 2;

                stmts.push(Stmt::new(
                    StmtKind::JumpIfFalse {
                        var: Expr::ident(cond_var, None),
                        target: point_before_else,
                    },
                    line,
                ));
                let then_result = self.expr(*then_branch, stmts);
                stmts.push(Stmt::new(
                    StmtKind::Assign {
                        var: result_var.clone(),
                        expr: then_result,
                        is_if_result_assign: true,
                    },
                    line,
                ));
                stmts.push(Stmt::new(StmtKind::Jump { target: exit_point }, line));
                stmts.push(Stmt::new(StmtKind::ProgramPoint(point_before_else), line));
                let else_result = self.expr(*else_branch, stmts);
                stmts.push(Stmt::new(
                    StmtKind::Assign {
                        var: result_var.clone(),
                        expr: else_result,
                        is_if_result_assign: true,
                    },
                    line,
                ));
                stmts.push(Stmt::new(StmtKind::ProgramPoint(exit_point), line));
                ExprKind::IfResultId(result_var).at(line)
            }
            ExprKind::FuncCall(..) | ExprKind::Uminus(_) | ExprKind::IfResultId(_) => {
                unreachable!("smart inlining leaves no calls, and uminus removal already ran")
            }
        }
    }
}

impl Default for IfLowering {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{Function, FunctionBody};

    fn public(mut e: Expr, is_public: bool) -> Expr {
        e.is_public = Some(is_public);
        e
    }

    #[test]
    fn public_if_lowers_to_jz_jmp_and_two_program_points() {
        let cond = public(Expr::ident("c", None), true);
        let if_expr = ExprKind::If(
            Box::new(cond),
            Box::new(Expr::number(1)),
            Box::new(Expr::number(2)),
        )
        .synthetic();
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("y", if_expr, None)], None),
            None,
        )]);
        IfLowering::new().lower(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert!(stmts.iter().any(|s| matches!(s.kind, StmtKind::JumpIfFalse { .. })));
        assert!(stmts.iter().any(|s| matches!(s.kind, StmtKind::Jump { .. })));
        assert_eq!(
            stmts.iter().filter(|s| matches!(s.kind, StmtKind::ProgramPoint(_))).count(),
            2
        );
        let StmtKind::Assign { var, expr, .. } = &stmts.last().unwrap().kind else {
            panic!()
        };
        assert_eq!(var, "y");
        assert!(matches!(expr.kind, ExprKind::IfResultId(_)));
    }

    #[test]
    fn secret_if_lowers_to_multiplexer_with_no_jumps() {
        let cond = public(Expr::ident("c", None), false);
        let if_expr = ExprKind::If(
            Box::new(cond),
            Box::new(Expr::number(1)),
            Box::new(Expr::number(2)),
        )
        .synthetic();
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("y", if_expr, None)], None),
            None,
        )]);
        IfLowering::new().lower(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert!(!stmts.iter().any(|s| matches!(s.kind, StmtKind::JumpIfFalse { .. } | StmtKind::Jump { .. })));
        let StmtKind::Assign { expr, .. } = &stmts.last().unwrap().kind else {
            panic!()
        };
        assert!(matches!(expr.kind, ExprKind::Binop(BinOp::Add, _, _)));
    }

    #[test]
    fn seq_from_inlined_call_is_flattened_into_main() {
        let seq = ExprKind::Seq(
            vec![Stmt::assign("_f_1_a", Expr::number(3), None)],
            Box::new(Expr::ident("_f_1_a", None)),
        )
        .synthetic();
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(vec![Stmt::assign("z", seq, None)], None),
            None,
        )]);
        IfLowering::new().lower(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert_eq!(stmts.len(), 2);
        assert!(matches!(&stmts[0].kind, StmtKind::Assign { var, .. } if var == "_f_1_a"));
        assert!(matches!(&stmts[1].kind, StmtKind::Assign { var, .. } if var == "z"));
    }
}
