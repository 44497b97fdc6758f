//! Call-graph construction and recursion detection, grounded on
//! `CallGraph.py`.

use std::collections::HashMap;

use mpcc_ast::{Expr, ExprKind, Program};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::CheckError;

const BUILTINS: [&str; 2] = ["randomnum", "randombit"];

#[derive(Debug)]
pub struct CallGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    /// Set by node insertion when a function name is declared twice, or
    /// when a user function redefines a built-in. Does not abort
    /// construction -- `insert_nodes` keeps scanning every function.
    pub func_overload: bool,
}

impl CallGraph {
    pub fn build(prog: &Program) -> Result<Self, CheckError> {
        let mut cg = CallGraph {
            graph: DiGraph::new(),
            index: HashMap::new(),
            func_overload: false,
        };
        cg.insert_nodes(prog);
        cg.insert_edges(prog)?;
        Ok(cg)
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        *self
            .index
            .entry(name.to_string())
            .or_insert_with(|| self.graph.add_node(name.to_string()))
    }

    fn insert_nodes(&mut self, prog: &Program) {
        for func in &prog.functions {
            if self.index.contains_key(&func.name) {
                self.func_overload = true;
            }
            if BUILTINS.contains(&func.name.as_str()) {
                self.func_overload = true;
            }
            self.node(&func.name);
        }
        for name in BUILTINS {
            self.node(name);
        }
    }

    fn insert_edges(&mut self, prog: &Program) -> Result<(), CheckError> {
        for func in &prog.functions {
            for stmt in &func.body.stmts {
                if let mpcc_ast::StmtKind::Assign { expr, .. } = &stmt.kind {
                    self.add_edges(expr, &func.name)?;
                }
            }
            if !func.is_main() {
                if let Some(tail) = &func.body.tail {
                    self.add_edges(tail, &func.name)?;
                }
            }
        }
        Ok(())
    }

    fn add_edges(&mut self, expr: &Expr, func_name: &str) -> Result<(), CheckError> {
        match &expr.kind {
            ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Identifier(_) => Ok(()),
            ExprKind::Binop(_, l, r) => {
                self.add_edges(l, func_name)?;
                self.add_edges(r, func_name)
            }
            ExprKind::Uminus(e) | ExprKind::Not(e) | ExprKind::Leak(e) => {
                self.add_edges(e, func_name)
            }
            ExprKind::If(c, t, e) => {
                self.add_edges(c, func_name)?;
                self.add_edges(t, func_name)?;
                self.add_edges(e, func_name)
            }
            ExprKind::FuncCall(name, args) => {
                let line = expr.line.unwrap_or(0);
                if name == "main" {
                    return Err(CheckError::CallToMain { line });
                }
                if !self.index.contains_key(name) {
                    return Err(CheckError::UndeclaredFunction {
                        line,
                        name: name.clone(),
                    });
                }
                let from = self.node(func_name);
                let to = self.node(name);
                self.graph.update_edge(from, to, ());
                for arg in args {
                    self.add_edges(arg, func_name)?;
                }
                Ok(())
            }
            ExprKind::IfResultId(_) | ExprKind::Seq(..) => {
                unreachable!("call-graph construction runs before if-lowering")
            }
        }
    }

    /// DFS from `main` with three-way coloring; reports only cycles
    /// reachable from `main` (`CallGraph.py`'s `has_recursion`).
    pub fn has_recursion(&self) -> bool {
        let Some(&main) = self.index.get("main") else {
            return false;
        };
        let mut visiting = vec![false; self.graph.node_count()];
        let mut visited = vec![false; self.graph.node_count()];
        self.dfs(main, &mut visiting, &mut visited)
    }

    fn dfs(&self, node: NodeIndex, visiting: &mut [bool], visited: &mut [bool]) -> bool {
        if visited[node.index()] {
            return false;
        }
        if visiting[node.index()] {
            return true;
        }
        visiting[node.index()] = true;
        for next in self.graph.neighbors(node) {
            if self.dfs(next, visiting, visited) {
                return true;
            }
        }
        visiting[node.index()] = false;
        visited[node.index()] = true;
        false
    }
}

/// `check_recursion`: overloaded/redefined names OR a cycle reachable from
/// `main`. Unreachable cycles are not detected -- preserved bug-for-bug.
pub fn check_recursion(prog: &Program) -> Result<bool, CheckError> {
    let cg = CallGraph::build(prog)?;
    Ok(cg.func_overload || cg.has_recursion())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcc_ast::{Function, FunctionBody, Stmt};

    fn func_calling(name: &str, callee: &str) -> Function {
        Function::new(
            name,
            vec![],
            FunctionBody::new(
                vec![Stmt::assign(
                    "x",
                    ExprKind::FuncCall(callee.to_string(), vec![]).at(Some(1)),
                    Some(1),
                )],
                None,
            ),
            Some(1),
        )
    }

    #[test]
    fn no_recursion_for_acyclic_calls() {
        let prog = Program::new(vec![
            func_calling("main", "f"),
            Function::new("f", vec![], FunctionBody::new(vec![], Some(Expr::number(1))), Some(1)),
        ]);
        assert!(!check_recursion(&prog).unwrap());
    }

    #[test]
    fn self_call_is_recursion() {
        let prog = Program::new(vec![func_calling("main", "main")]);
        let err = CallGraph::build(&prog).unwrap_err();
        assert!(matches!(err, CheckError::CallToMain { .. }));
    }

    #[test]
    fn mutual_recursion_reachable_from_main_is_detected() {
        let prog = Program::new(vec![
            func_calling("main", "f"),
            func_calling("f", "g"),
            func_calling("g", "f"),
        ]);
        assert!(check_recursion(&prog).unwrap());
    }

    #[test]
    fn duplicate_function_name_sets_overload() {
        let prog = Program::new(vec![
            Function::new("main", vec![], FunctionBody::new(vec![], None), Some(1)),
            Function::new("main", vec![], FunctionBody::new(vec![], None), Some(2)),
        ]);
        assert!(check_recursion(&prog).unwrap());
    }

    #[test]
    fn undeclared_callee_is_an_error() {
        let prog = Program::new(vec![func_calling("main", "nope")]);
        let err = CallGraph::build(&prog).unwrap_err();
        assert!(matches!(err, CheckError::UndeclaredFunction { .. }));
    }
}
