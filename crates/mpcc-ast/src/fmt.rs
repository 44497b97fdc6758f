//! `Display` impls producing a human-readable rendering of the AST, used by
//! the CLI's `--trace` flag to show the program after each pass. These are
//! debug output only -- the fixed-vocabulary IR text in §6 is produced
//! separately by `mpcc-codegen`'s emitter, not by these impls.

use std::fmt;

use crate::expr::{Expr, ExprKind};
use crate::program::{Function, FunctionBody, Program};
use crate::stmt::{Stmt, StmtKind};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => write!(f, "{n}"),
            ExprKind::Boolean(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            ExprKind::Identifier(name) => write!(f, "{name}"),
            ExprKind::IfResultId(name) => write!(f, "{name} (if-result)"),
            ExprKind::Uminus(e) => write!(f, "(-{e})"),
            ExprKind::Not(e) => write!(f, "!{e}"),
            ExprKind::Leak(e) => write!(f, "leak {e}"),
            ExprKind::Binop(op, l, r) => write!(f, "({l} {op} {r})"),
            ExprKind::If(c, t, e) => write!(f, "(if {c} then {t} else {e})"),
            ExprKind::FuncCall(name, args) => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            ExprKind::Seq(stmts, tail) => {
                for s in stmts {
                    write!(f, "{s}\n\t")?;
                }
                write!(f, "{tail}")
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Assign { var, expr, .. } => write!(f, "{var} = {expr};"),
            StmtKind::Input { var, provider, ty } => write!(f, "{var} << {provider} : {ty};"),
            StmtKind::Output { value, label } => write!(f, "{value} >> {label};"),
            StmtKind::JumpIfFalse { var, target } => write!(f, "JZ {var} {target};"),
            StmtKind::Jump { target } => write!(f, "JMP {target};"),
            StmtKind::ProgramPoint(n) => write!(f, "ProgramPoint {n}"),
        }
    }
}

impl fmt::Display for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            writeln!(f, "\t{stmt}")?;
        }
        if let Some(tail) = &self.tail {
            writeln!(f, "\t{tail}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {{\n{}}}", self.name, self.params.join(", "), self.body)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{func}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinOp;
    use crate::stmt::StmtKind;
    use crate::types::Type;

    #[test]
    fn binop_renders_parenthesized_infix() {
        let e = ExprKind::Binop(BinOp::Add, Box::new(Expr::number(1)), Box::new(Expr::number(2)))
            .synthetic();
        assert_eq!(e.to_string(), "(1 + 2)");
    }

    #[test]
    fn uminus_and_not_render_prefix() {
        let u = ExprKind::Uminus(Box::new(Expr::ident("x", None))).synthetic();
        assert_eq!(u.to_string(), "(-x)");
        let n = ExprKind::Not(Box::new(Expr::ident("b", None))).synthetic();
        assert_eq!(n.to_string(), "!b");
    }

    #[test]
    fn input_statement_renders_provider_and_type() {
        let stmt = Stmt::synthetic(StmtKind::Input {
            var: "x".into(),
            provider: 1,
            ty: Type::Num,
        });
        assert_eq!(stmt.to_string(), "x << 1 : num;");
    }

    #[test]
    fn assign_statement_renders_with_trailing_semicolon() {
        let stmt = Stmt::assign("y", Expr::number(7), None);
        assert_eq!(stmt.to_string(), "y = 7;");
    }

    #[test]
    fn program_rendering_matches_snapshot() {
        use crate::program::{Function, FunctionBody};

        let prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::synthetic(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Num }),
                    Stmt::assign(
                        "z",
                        ExprKind::Binop(BinOp::Add, Box::new(Expr::ident("x", None)), Box::new(Expr::number(1)))
                            .synthetic(),
                        None,
                    ),
                    Stmt::synthetic(StmtKind::Output { value: Expr::ident("z", None), label: "out".into() }),
                ],
                None,
            ),
            None,
        )]);

        insta::assert_snapshot!(prog.to_string(), @r###"
        main () {
        	x << 1 : num;
        	z = (x + 1);
        	z >> out;
        }"###);
    }
}
