//! §4.10: constant propagation, grounded on `ASTmanipulations.py`'s
//! `constant_propagation`/`eval_expr`/`rename_occurrences_of_var`.
//!
//! A single forward pass over `main`'s (now flat, atomic-operand) statement
//! list tracking an abstract value per variable: `constant(v) | unknown`.
//! Constant-valued assignments and leaks are folded away; a renamed-to
//! (`v := w;` or `v := <if-result>;`) is eliminated by substituting `w` for
//! `v` in every remaining statement instead of emitting a copy.

use std::collections::HashMap;

use mpcc_ast::{BinOp, Expr, ExprKind, Program, Stmt, StmtKind};

use crate::warning::Warning;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Literal {
    Num(i64),
    Bool(bool),
}

impl Literal {
    fn into_expr(self) -> Expr {
        match self {
            Literal::Num(n) => Expr::number(n),
            Literal::Bool(b) => Expr::boolean(b),
        }
    }

    fn display(self) -> String {
        match self {
            Literal::Num(n) => n.to_string(),
            Literal::Bool(b) => if b { "1" } else { "0" }.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CPValue {
    Constant(Literal),
    Unknown,
}

impl CPValue {
    fn is_constant(&self) -> bool {
        matches!(self, CPValue::Constant(_))
    }

    fn literal(&self) -> Literal {
        match self {
            CPValue::Constant(l) => *l,
            CPValue::Unknown => panic!("literal queried on a non-constant value"),
        }
    }
}

pub struct ConstProp {
    values: HashMap<String, CPValue>,
    warnings: Vec<Warning>,
}

impl ConstProp {
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert("_randomnum".to_string(), CPValue::Unknown);
        values.insert("_randombit".to_string(), CPValue::Unknown);
        ConstProp {
            values,
            warnings: Vec::new(),
        }
    }

    pub fn run(&mut self, prog: &mut Program) -> Vec<Warning> {
        let main = prog.main_mut();
        let mut input = std::mem::take(&mut main.body.stmts);
        let mut output = Vec::new();
        let mut i = 0;
        while i < input.len() {
            let stmt = input[i].clone();
            let line = stmt.line;
            match stmt.kind {
                StmtKind::ProgramPoint(_) | StmtKind::Jump { .. } => output.push(stmt),
                StmtKind::Input { ref var, .. } => {
                    self.values.insert(var.clone(), CPValue::Unknown);
                    output.push(stmt);
                }
                StmtKind::Output { value, label } => {
                    let cp = self.value_of(&value);
                    let value = match cp {
                        CPValue::Constant(lit) => {
                            self.warnings.push(Warning::ConstantOutput {
                                name: display_name(&value),
                                value: lit.display(),
                            });
                            lit.into_expr()
                        }
                        CPValue::Unknown => value,
                    };
                    output.push(Stmt::new(StmtKind::Output { value, label }, line));
                }
                StmtKind::JumpIfFalse { var, target } => {
                    let cp = self.value_of(&var);
                    match cp {
                        CPValue::Unknown => output.push(Stmt::new(StmtKind::JumpIfFalse { var, target }, line)),
                        CPValue::Constant(Literal::Bool(false)) => {
                            output.push(Stmt::new(StmtKind::Jump { target }, line));
                        }
                        CPValue::Constant(Literal::Bool(true)) => {
                            // condition known true: fall through, never jump, emit nothing
                        }
                        CPValue::Constant(Literal::Num(_)) => unreachable!("JZ condition type-checked as bool"),
                    }
                }
                StmtKind::Assign { var, expr, is_if_result_assign } => {
                    if is_if_result_assign {
                        let evaluated = self.eval_expr(expr);
                        output.push(Stmt::new(
                            StmtKind::Assign { var: var.clone(), expr: evaluated, is_if_result_assign: true },
                            line,
                        ));
                        self.values.insert(var, CPValue::Unknown);
                    } else {
                        self.assign(var, expr, line, &mut input, i, &mut output);
                    }
                }
            }
            i += 1;
        }
        let mut warnings = Vec::new();
        std::mem::swap(&mut warnings, &mut self.warnings);
        prog.main_mut().body.stmts = output;
        warnings
    }

    fn assign(
        &mut self,
        var: String,
        expr: Expr,
        line: Option<u32>,
        remaining: &mut [Stmt],
        index: usize,
        output: &mut Vec<Stmt>,
    ) {
        match expr.kind {
            ExprKind::Number(n) => {
                self.values.insert(var, CPValue::Constant(Literal::Num(n)));
            }
            ExprKind::Boolean(b) => {
                self.values.insert(var, CPValue::Constant(Literal::Bool(b)));
            }
            ExprKind::Identifier(name) => {
                if name == "_randomnum" || name == "_randombit" {
                    self.values.insert(var.clone(), CPValue::Unknown);
                    output.push(Stmt::new(
                        StmtKind::Assign { var, expr: ExprKind::Identifier(name).at(line), is_if_result_assign: false },
                        line,
                    ));
                } else {
                    rename_occurrences(&mut remaining[index + 1..], &var, &name);
                }
            }
            ExprKind::IfResultId(name) => {
                rename_occurrences(&mut remaining[index + 1..], &var, &name);
            }
            ExprKind::Leak(sub) => {
                match sub.kind {
                    ExprKind::Number(_) | ExprKind::Boolean(_) => {
                        let lit = literal_of_atomic(&sub.kind);
                        self.values.insert(var, CPValue::Constant(lit));
                    }
                    ExprKind::Identifier(name) | ExprKind::IfResultId(name) => {
                        let value = self.values.get(&name).cloned().unwrap_or(CPValue::Unknown);
                        if !value.is_constant() {
                            output.push(Stmt::new(
                                StmtKind::Assign {
                                    var: var.clone(),
                                    expr: ExprKind::Leak(Box::new(ExprKind::Identifier(name).at(line))).at(line),
                                    is_if_result_assign: false,
                                },
                                line,
                            ));
                        }
                        self.values.insert(var, value);
                    }
                    other => unreachable!("non-atomic Leak operand after temp insertion: {other:?}"),
                }
            }
            ExprKind::Not(sub) => match sub.kind {
                ExprKind::Boolean(b) => {
                    self.values.insert(var, CPValue::Constant(Literal::Bool(!b)));
                }
                ExprKind::Identifier(name) | ExprKind::IfResultId(name) => {
                    let value = self.values.get(&name).cloned().unwrap_or(CPValue::Unknown);
                    match value {
                        CPValue::Unknown => {
                            output.push(Stmt::new(
                                StmtKind::Assign {
                                    var: var.clone(),
                                    expr: ExprKind::Not(Box::new(ExprKind::Identifier(name).at(line))).at(line),
                                    is_if_result_assign: false,
                                },
                                line,
                            ));
                            self.values.insert(var, CPValue::Unknown);
                        }
                        CPValue::Constant(Literal::Bool(b)) => {
                            self.values.insert(var, CPValue::Constant(Literal::Bool(!b)));
                        }
                        CPValue::Constant(Literal::Num(_)) => {
                            unreachable!("Not operand type-checked as bool")
                        }
                    }
                }
                other => unreachable!("non-atomic Not operand after temp insertion: {other:?}"),
            },
            ExprKind::Binop(op, l, r) => self.binop(var, op, *l, *r, line, output),
            other => unreachable!("unexpected rhs shape reaching constant propagation: {other:?}"),
        }
    }

    fn value_of(&self, expr: &Expr) -> CPValue {
        match &expr.kind {
            ExprKind::Number(n) => CPValue::Constant(Literal::Num(*n)),
            ExprKind::Boolean(b) => CPValue::Constant(Literal::Bool(*b)),
            ExprKind::Identifier(name) | ExprKind::IfResultId(name) => {
                self.values.get(name).cloned().unwrap_or(CPValue::Unknown)
            }
            other => unreachable!("non-atomic operand after temp insertion: {other:?}"),
        }
    }

    fn binop(&mut self, var: String, op: BinOp, l: Expr, r: Expr, line: Option<u32>, output: &mut Vec<Stmt>) {
        let left_value = self.value_of(&l);
        let right_value = self.value_of(&r);

        if let (CPValue::Constant(lv), CPValue::Constant(rv)) = (&left_value, &right_value) {
            self.values.insert(var, CPValue::Constant(fold(op, *lv, *rv)));
            return;
        }

        let boolean_identity_op = matches!(op, BinOp::Or | BinOp::And | BinOp::Eq | BinOp::Neq);
        if boolean_identity_op && (left_value.is_constant() || right_value.is_constant()) {
            // Normalize so `const_lit` is whichever operand is constant and
            // `other` is the remaining (non-constant) operand.
            let (const_lit, other) = if let CPValue::Constant(lit) = left_value {
                (lit, r)
            } else {
                (right_value.literal(), l)
            };

            if let Literal::Bool(b) = const_lit {
                self.values.insert(var.clone(), CPValue::Unknown);
                let folded = match op {
                    BinOp::Or if b => {
                        self.values.insert(var, CPValue::Constant(Literal::Bool(true)));
                        return;
                    }
                    BinOp::Or => other,
                    BinOp::And if !b => {
                        self.values.insert(var, CPValue::Constant(Literal::Bool(false)));
                        return;
                    }
                    BinOp::And => other,
                    BinOp::Eq if b => other,
                    BinOp::Eq => ExprKind::Not(Box::new(other)).at(line),
                    BinOp::Neq if !b => other,
                    BinOp::Neq => ExprKind::Not(Box::new(other)).at(line),
                    _ => unreachable!(),
                };
                output.push(Stmt::assign(var, folded, line));
                return;
            }

            // Constant operand is numeric: no boolean identity applies here
            // (only `==`/`!=` reach this point for numbers), materialize both
            // operands into literal form and keep the statement.
            self.values.insert(var.clone(), CPValue::Unknown);
            let materialized = ExprKind::Binop(op, Box::new(const_lit.into_expr()), Box::new(other)).at(line);
            output.push(Stmt::assign(var, materialized, line));
            return;
        }

        self.values.insert(var.clone(), CPValue::Unknown);
        let left = materialize(l, &left_value);
        let right = materialize(r, &right_value);
        output.push(Stmt::assign(var, ExprKind::Binop(op, Box::new(left), Box::new(right)).at(line), line));
    }

    /// §4.10's reduced folding used only for the rhs of an `is_if_result_assign`
    /// statement. Grounded on `eval_expr`: it substitutes known constants but,
    /// unlike the main per-statement folding above, never rewrites the
    /// statement list -- it only returns a replacement expression.
    fn eval_expr(&self, expr: Expr) -> Expr {
        let line = expr.line;
        match expr.kind {
            ExprKind::Number(_) | ExprKind::Boolean(_) => expr,
            ExprKind::Identifier(name) => match self.values.get(&name) {
                Some(CPValue::Constant(lit)) => lit.into_expr(),
                _ => ExprKind::Identifier(name).at(line),
            },
            ExprKind::IfResultId(name) => Expr::ident(name, line),
            ExprKind::Leak(sub) => self.eval_expr(*sub),
            ExprKind::Not(sub) => {
                let value = match &sub.kind {
                    ExprKind::Boolean(b) => Some(*b),
                    ExprKind::Identifier(name) | ExprKind::IfResultId(name) => match self.values.get(name) {
                        Some(CPValue::Constant(Literal::Bool(b))) => Some(*b),
                        _ => None,
                    },
                    _ => None,
                };
                match value {
                    Some(b) => Expr::boolean(!b),
                    None => ExprKind::Not(sub).at(line),
                }
            }
            ExprKind::Binop(op, l, r) => {
                let lv = self.value_of(&l);
                let rv = self.value_of(&r);
                if lv.is_constant() && rv.is_constant() {
                    fold(op, lv.literal(), rv.literal()).into_expr()
                } else {
                    ExprKind::Binop(op, l, r).at(line)
                }
            }
            other => unreachable!("unexpected if-result rhs shape: {other:?}"),
        }
    }
}

impl Default for ConstProp {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Identifier(name) | ExprKind::IfResultId(name) => name.clone(),
        other => unreachable!("output value is not atomic: {other:?}"),
    }
}

fn literal_of_atomic(kind: &ExprKind) -> Literal {
    match kind {
        ExprKind::Number(n) => Literal::Num(*n),
        ExprKind::Boolean(b) => Literal::Bool(*b),
        other => unreachable!("not a literal: {other:?}"),
    }
}

/// Rewrites an atomic operand back into a literal node when its value is
/// statically known, so the emitted statement carries the constant inline
/// even though the variable as a whole could not be folded away.
fn materialize(expr: Expr, value: &CPValue) -> Expr {
    match value {
        CPValue::Constant(lit) => lit.into_expr(),
        CPValue::Unknown => expr,
    }
}

fn fold(op: BinOp, l: Literal, r: Literal) -> Literal {
    match (op, l, r) {
        (BinOp::Add, Literal::Num(a), Literal::Num(b)) => Literal::Num(a + b),
        (BinOp::Sub, Literal::Num(a), Literal::Num(b)) => Literal::Num(a - b),
        (BinOp::Mul, Literal::Num(a), Literal::Num(b)) => Literal::Num(a * b),
        (BinOp::Div, Literal::Num(a), Literal::Num(b)) => Literal::Num(floor_div(a, b)),
        (BinOp::Or, Literal::Bool(a), Literal::Bool(b)) => Literal::Bool(a || b),
        (BinOp::And, Literal::Bool(a), Literal::Bool(b)) => Literal::Bool(a && b),
        (BinOp::Eq, a, b) => Literal::Bool(a == b),
        (BinOp::Neq, a, b) => Literal::Bool(a != b),
        (BinOp::Lt, Literal::Num(a), Literal::Num(b)) => Literal::Bool(a < b),
        (BinOp::Gt, Literal::Num(a), Literal::Num(b)) => Literal::Bool(a > b),
        (BinOp::Le, Literal::Num(a), Literal::Num(b)) => Literal::Bool(a <= b),
        (BinOp::Ge, Literal::Num(a), Literal::Num(b)) => Literal::Bool(a >= b),
        (op, l, r) => unreachable!("ill-typed constant fold: {op:?} on {l:?}/{r:?}"),
    }
}

/// True floor division, matching Python's `//` (the reference IR's division
/// semantics): unlike `i64::div_euclid`, which rounds toward negative
/// infinity only when the *remainder* would be negative, this rounds toward
/// negative infinity whenever the quotient itself is negative.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn rename_occurrences(stmts: &mut [Stmt], old: &str, new: &str) {
    for stmt in stmts {
        match &mut stmt.kind {
            StmtKind::Output { value, .. } => rename_in_expr(value, old, new),
            StmtKind::JumpIfFalse { var, .. } => rename_in_expr(var, old, new),
            StmtKind::Assign { expr, .. } => rename_in_expr(expr, old, new),
            StmtKind::Input { .. } | StmtKind::Jump { .. } | StmtKind::ProgramPoint(_) => {}
        }
    }
}

fn rename_in_expr(expr: &mut Expr, old: &str, new: &str) {
    match &mut expr.kind {
        ExprKind::Identifier(name) | ExprKind::IfResultId(name) => {
            if name == old {
                *name = new.to_string();
            }
        }
        ExprKind::Not(sub) | ExprKind::Leak(sub) => rename_in_expr(sub, old, new),
        ExprKind::Binop(_, l, r) => {
            rename_in_expr(l, old, new);
            rename_in_expr(r, old, new);
        }
        ExprKind::Number(_) | ExprKind::Boolean(_) => {}
        other => unreachable!("unexpected shape during rename: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{Function, FunctionBody, Type};

    fn run(prog: &mut Program) -> Vec<Warning> {
        ConstProp::new().run(prog)
    }

    #[test]
    fn constant_binop_folds_away_the_assignment() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::assign("x", Expr::number(3), None),
                    Stmt::assign("y", Expr::number(4), None),
                    Stmt::assign(
                        "z",
                        ExprKind::Binop(BinOp::Add, Box::new(Expr::ident("x", None)), Box::new(Expr::ident("y", None)))
                            .synthetic(),
                        None,
                    ),
                    Stmt::new(StmtKind::Output { value: Expr::ident("z", None), label: "r".into() }, None),
                ],
                None,
            ),
            None,
        )]);
        run(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert_eq!(stmts.len(), 1);
        let StmtKind::Output { value, .. } = &stmts[0].kind else { panic!() };
        assert!(matches!(value.kind, ExprKind::Number(7)));
    }

    #[test]
    fn identifier_assignment_is_eliminated_by_substitution() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::new(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Num }, None),
                    Stmt::assign("y", Expr::ident("x", None), None),
                    Stmt::new(StmtKind::Output { value: Expr::ident("y", None), label: "r".into() }, None),
                ],
                None,
            ),
            None,
        )]);
        run(&mut prog);
        let stmts = &prog.main().body.stmts;
        assert_eq!(stmts.len(), 2);
        let StmtKind::Output { value, .. } = &stmts[1].kind else { panic!() };
        assert!(matches!(&value.kind, ExprKind::Identifier(n) if n == "x"));
    }

    #[test]
    fn constant_output_is_warned_about() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::assign("x", Expr::number(5), None),
                    Stmt::new(StmtKind::Output { value: Expr::ident("x", None), label: "r".into() }, None),
                ],
                None,
            ),
            None,
        )]);
        run(&mut prog);
        let StmtKind::Output { value, .. } = &prog.main().body.stmts[0].kind else { panic!() };
        assert!(matches!(value.kind, ExprKind::Number(5)));
    }

    #[test]
    fn false_or_x_propagates_to_just_x() {
        let mut prog = Program::new(vec![Function::new(
            "main",
            vec![],
            FunctionBody::new(
                vec![
                    Stmt::new(StmtKind::Input { var: "x".into(), provider: 1, ty: Type::Bool }, None),
                    Stmt::assign(
                        "z",
                        ExprKind::Binop(BinOp::Or, Box::new(Expr::boolean(false)), Box::new(Expr::ident("x", None)))
                            .synthetic(),
                        None,
                    ),
                ],
                None,
            ),
            None,
        )]);
        run(&mut prog);
        let StmtKind::Assign { expr, .. } = &prog.main().body.stmts[1].kind else { panic!() };
        assert!(matches!(&expr.kind, ExprKind::Identifier(n) if n == "x"));
    }

    #[test]
    fn division_with_negative_divisor_floors_toward_negative_infinity() {
        // Python's `7 // -2` is `-4`, not `-3`. `i64::div_euclid` gives `-3`
        // here since it rounds based on the remainder's sign, not the
        // quotient's; true floor division must give `-4`.
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(fold(BinOp::Div, Literal::Num(7), Literal::Num(-2)), Literal::Num(-4));
    }

    #[test]
    fn division_matches_plain_division_when_signs_agree() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, -2), 3);
    }
}
