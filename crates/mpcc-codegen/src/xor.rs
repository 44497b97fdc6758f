//! §4.11: XOR specialization and IR emission, grounded on
//! `ASTmanipulations.py`'s `introduce_xor`/`emit_instructions`/
//! `translate_instruction`.
//!
//! Constant propagation changes statement and operand shapes, so the type
//! checker is re-run once in lax mode to refresh `ty` before XOR
//! specialization inspects it. Emission then walks `main`'s final statement
//! list and renders one fixed-vocabulary textual line per statement (§6).

use mpcc_ast::{BinOp, Expr, ExprKind, Program, Stmt, StmtKind, Type};

/// Renames every boolean-typed `!=` binop to `xor`. The back end implements
/// boolean inequality more cheaply than numeric inequality.
pub fn specialize(prog: &mut Program) {
    mpcc_check::type_check_bool_num(prog, true);
    for stmt in &mut prog.main_mut().body.stmts {
        if let StmtKind::Assign { expr, .. } = &mut stmt.kind {
            if let ExprKind::Binop(op @ BinOp::Neq, l, _) = &mut expr.kind {
                if l.ty() == Type::Bool {
                    *op = BinOp::Xor;
                }
            }
        }
    }
}

/// Renders `main`'s statement list as one textual IR line per statement.
pub fn emit(prog: &Program) -> Vec<String> {
    prog.main().body.stmts.iter().map(translate).collect()
}

fn translate(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Input { var, provider, .. } => format!("INPUT {provider} {var}"),
        StmtKind::Output { value, label } => format!("OUTPUT {} {label}", operand(value)),
        StmtKind::ProgramPoint(n) => format!("PROGRAM_POINT {n}"),
        StmtKind::Jump { target } => format!("JMP {target}"),
        StmtKind::JumpIfFalse { var, target } => format!("JZ {} {target}", operand(var)),
        StmtKind::Assign { var, expr, .. } => translate_assign(var, expr),
    }
}

fn translate_assign(var: &str, expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Number(_) | ExprKind::Boolean(_) => format!("MOVE {} {var}", operand(expr)),
        ExprKind::Identifier(name) => match name.as_str() {
            "_randomnum" => format!("RANDOM {var}"),
            "_randombit" => format!("RANDOM_BIT {var}"),
            _ => format!("MOVE {name} {var}"),
        },
        ExprKind::Leak(sub) => format!("LEAK {} {var}", operand(sub)),
        ExprKind::Not(sub) => format!("NOT {} {var}", operand(sub)),
        ExprKind::Binop(op, l, r) => {
            let opcode = match op {
                BinOp::Add => "PLUS",
                BinOp::Sub => "MINUS",
                BinOp::Mul => "MULTIPLY",
                BinOp::Div => "DIVIDE",
                BinOp::Or => "OR",
                BinOp::And => "AND",
                BinOp::Xor => "XOR",
                BinOp::Eq => "EQUALS",
                BinOp::Neq => "NOT_EQUALS",
                BinOp::Lt => "LT",
                BinOp::Gt => "GT",
                BinOp::Le => "LTE",
                BinOp::Ge => "GTE",
            };
            format!("{opcode} {} {} {var}", operand(l), operand(r))
        }
        other => unreachable!("unexpected rhs shape reaching emission: {other:?}"),
    }
}

fn operand(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Number(n) => n.to_string(),
        ExprKind::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        ExprKind::Identifier(name) | ExprKind::IfResultId(name) => name.clone(),
        other => unreachable!("non-atomic operand reaching emission: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{Function, FunctionBody, Type};

    fn bool_binop(op: BinOp, l: Expr, r: Expr) -> Expr {
        let mut e = ExprKind::Binop(op, Box::new(l), Box::new(r)).synthetic();
        e.ty = Some(Type::Bool);
        e
    }

    #[test]
    fn boolean_neq_becomes_xor() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::new(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Bool }, None),
                    Stmt::new(StmtKind::Input { var: "y".into(), provider: 2, ty: Type::Bool }, None),
                    Stmt::assign(
                        "z",
                        ExprKind::Binop(BinOp::Neq, Box::new(Expr::ident("x", None)), Box::new(Expr::ident("y", None)))
                            .synthetic(),
                        None,
                    ),
                ],
                None,
            ),
            None,
        )]);
        specialize(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[2].kind else { panic!() };
        assert!(matches!(expr.kind, ExprKind::Binop(BinOp::Xor, _, _)));
    }

    #[test]
    fn numeric_neq_is_left_alone() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::new(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Num }, None),
                    Stmt::new(StmtKind::Input { var: "y".into(), provider: 2, ty: Type::Num }, None),
                    Stmt::assign(
                        "z",
                        ExprKind::Binop(BinOp::Neq, Box::new(Expr::ident("x", None)), Box::new(Expr::ident("y", None)))
                            .synthetic(),
                        None,
                    ),
                ],
                None,
            ),
            None,
        )]);
        specialize(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[2].kind else { panic!() };
        assert!(matches!(expr.kind, ExprKind::Binop(BinOp::Neq, _, _)));
    }

    #[test]
    fn emits_arithmetic_input_and_output() {
        let prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::new(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Num }, None),
                    Stmt::new(StmtKind::Input { var: "y".into(), provider: 2, ty: Type::Num }, None),
                    Stmt::assign(
                        "z",
                        bool_binop(BinOp::Add, Expr::ident("x", None), Expr::ident("y", None)),
                        None,
                    ),
                    Stmt::new(StmtKind::Output { value: Expr::ident("z", None), label: "out".into() }, None),
                ],
                None,
            ),
            None,
        )]);
        let lines = emit(&prog);
        assert_eq!(
            lines,
            vec!["INPUT 1 x", "INPUT 2 y", "PLUS x y z", "OUTPUT z out"]
        );
    }

    #[test]
    fn randomness_reads_translate_to_random_opcodes() {
        let prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::assign("_tmp1", Expr::ident("_randomnum", None), None),
                    Stmt::assign("_tmp2", Expr::ident("_randombit", None), None),
                ],
                None,
            ),
            None,
        )]);
        let lines = emit(&prog);
        assert_eq!(lines, vec!["RANDOM _tmp1", "RANDOM_BIT _tmp2"]);
    }
}
