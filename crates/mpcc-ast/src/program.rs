//! `Program` / `Function` / `FunctionBody`: the top of the AST.

use crate::expr::Expr;
use crate::stmt::Stmt;

/// An ordered sequence of statements plus an optional trailing expression.
/// The trailing expression is the function's return value; it is present
/// for every function except `main`, which never returns a value (its
/// statements are its entire effect, expressed as `Input`/`Output`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionBody {
    pub stmts: Vec<Stmt>,
    pub tail: Option<Expr>,
}

impl FunctionBody {
    pub fn new(stmts: Vec<Stmt>, tail: Option<Expr>) -> Self {
        FunctionBody { stmts, tail }
    }
}

/// A function declaration: name, ordered parameter list, and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: FunctionBody,
    pub line: Option<u32>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        body: FunctionBody,
        line: Option<u32>,
    ) -> Self {
        Function {
            name: name.into(),
            params,
            body,
            line,
        }
    }

    pub fn is_main(&self) -> bool {
        self.name == "main"
    }
}

/// A whole program: an ordered list of functions. After §4.7's smart
/// inlining this list always has exactly one element, named `main`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn new(functions: Vec<Function>) -> Self {
        Program { functions }
    }

    pub fn find(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// The program's `main` function. Panics if absent -- call sites that
    /// might legitimately be missing `main` should go through
    /// `mpcc-check`'s `check_main` first.
    pub fn main(&self) -> &Function {
        self.find("main").expect("program has no 'main' function")
    }

    pub fn main_mut(&mut self) -> &mut Function {
        self.functions
            .iter_mut()
            .find(|f| f.name == "main")
            .expect("program has no 'main' function")
    }
}
