//! A recursive-descent parser over [`Token`]s, grounded on `Parser.py`'s
//! grammar and precedence table. Precedence tiers, loosest to tightest:
//! `leak` (right) < `||` (left) < `&&` (left) < unary `!` (right) <
//! comparisons (nonassoc) < `+`/`-` (left) < `*`/`/` (left) < unary `-`
//! (right, tightest).

use mpcc_ast::{BinOp, Expr, ExprKind, Function, FunctionBody, Program, Stmt, StmtKind, Type};

use crate::error::SyntaxError;
use crate::lexer::{tokenize, Spanned, Token};

/// Parses a complete program from source text.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn lookahead(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn bump(&mut self) -> Spanned {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self) -> SyntaxError {
        if *self.current() == Token::Eof {
            SyntaxError::UnexpectedEof
        } else {
            SyntaxError::UnexpectedToken {
                line: self.line(),
                symbol: format!("{:?}", self.current()),
            }
        }
    }

    fn expect(&mut self, want: &Token) -> Result<Spanned, SyntaxError> {
        if self.current() == want {
            Ok(self.bump())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_ident(&mut self) -> Result<(String, u32), SyntaxError> {
        let line = self.line();
        match self.current().clone() {
            Token::Ident(name) => {
                self.bump();
                Ok((name, line))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn expect_number(&mut self) -> Result<i64, SyntaxError> {
        match self.current().clone() {
            Token::Number(n) => {
                self.bump();
                Ok(n)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut functions = Vec::new();
        while *self.current() != Token::Eof {
            functions.push(self.parse_function()?);
        }
        Ok(Program::new(functions))
    }

    fn parse_function(&mut self) -> Result<Function, SyntaxError> {
        if *self.current() == Token::Main {
            let line = self.line();
            self.bump();
            self.expect(&Token::LParen)?;
            self.expect(&Token::RParen)?;
            self.expect(&Token::LBrace)?;
            let stmts = self.parse_main_stmts()?;
            self.expect(&Token::RBrace)?;
            return Ok(Function::new(
                "main",
                vec![],
                FunctionBody::new(stmts, None),
                Some(line),
            ));
        }

        let (name, line) = self.expect_ident()?;
        let params = self.parse_arglist()?;
        self.expect(&Token::LBrace)?;
        let body = self.parse_funcbody()?;
        self.expect(&Token::RBrace)?;
        Ok(Function::new(name, params, body, Some(line)))
    }

    fn parse_arglist(&mut self) -> Result<Vec<String>, SyntaxError> {
        self.expect(&Token::LParen)?;
        if *self.current() == Token::RParen {
            self.bump();
            return Ok(vec![]);
        }
        let mut args = vec![self.expect_ident()?.0];
        while *self.current() == Token::Comma {
            self.bump();
            args.push(self.expect_ident()?.0);
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    /// `main`'s body is statements only, no trailing expression.
    fn parse_main_stmts(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();
        while *self.current() != Token::RBrace {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    /// A statement begins with `ID ASSIGN|INPUT|OUTPUT`; anything else
    /// starting at the current position is the trailing expression.
    fn starts_statement(&self) -> bool {
        matches!(self.current(), Token::Ident(_))
            && matches!(
                self.lookahead(1),
                Token::Assign | Token::InputArrow | Token::OutputArrow
            )
    }

    fn parse_funcbody(&mut self) -> Result<FunctionBody, SyntaxError> {
        let mut stmts = Vec::new();
        while self.starts_statement() {
            stmts.push(self.parse_stmt()?);
        }
        let tail = self.parse_expression()?;
        Ok(FunctionBody::new(stmts, Some(tail)))
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let (name, line) = self.expect_ident()?;
        match self.current() {
            Token::Assign => {
                self.bump();
                let expr = self.parse_expression()?;
                self.expect(&Token::Semicolon)?;
                Ok(Stmt::new(
                    StmtKind::Assign {
                        var: name,
                        expr,
                        is_if_result_assign: false,
                    },
                    Some(line),
                ))
            }
            Token::InputArrow => {
                self.bump();
                let provider = self.expect_number()?;
                self.expect(&Token::Colon)?;
                let ty = self.parse_type()?;
                self.expect(&Token::Semicolon)?;
                Ok(Stmt::new(
                    StmtKind::Input {
                        var: name,
                        provider,
                        ty,
                    },
                    Some(line),
                ))
            }
            Token::OutputArrow => {
                self.bump();
                let (label, label_line) = self.expect_ident()?;
                self.expect(&Token::Semicolon)?;
                Ok(Stmt::new(
                    StmtKind::Output {
                        value: ExprKind::Identifier(name).at(Some(line)),
                        label,
                    },
                    Some(label_line),
                ))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_type(&mut self) -> Result<Type, SyntaxError> {
        match self.current() {
            Token::Bool => {
                self.bump();
                Ok(Type::Bool)
            }
            Token::Num => {
                self.bump();
                Ok(Type::Num)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_leak()
    }

    fn parse_leak(&mut self) -> Result<Expr, SyntaxError> {
        if *self.current() == Token::Leak {
            let line = self.line();
            self.bump();
            let inner = self.parse_leak()?;
            return Ok(ExprKind::Leak(Box::new(inner)).at(Some(line)));
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while *self.current() == Token::Or {
            let line = self.line();
            self.bump();
            let right = self.parse_and()?;
            left = ExprKind::Binop(BinOp::Or, Box::new(left), Box::new(right)).at(Some(line));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_not()?;
        while *self.current() == Token::And {
            let line = self.line();
            self.bump();
            let right = self.parse_not()?;
            left = ExprKind::Binop(BinOp::And, Box::new(left), Box::new(right)).at(Some(line));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, SyntaxError> {
        if *self.current() == Token::Not {
            let line = self.line();
            self.bump();
            let inner = self.parse_not()?;
            return Ok(ExprKind::Not(Box::new(inner)).at(Some(line)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_additive()?;
        let op = match self.current() {
            Token::Equals => BinOp::Eq,
            Token::Neq => BinOp::Neq,
            Token::Lt => BinOp::Lt,
            Token::Gt => BinOp::Gt,
            Token::Lte => BinOp::Le,
            Token::Gte => BinOp::Ge,
            _ => return Ok(left),
        };
        let line = self.line();
        self.bump();
        let right = self.parse_additive()?;
        Ok(ExprKind::Binop(op, Box::new(left), Box::new(right)).at(Some(line)))
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            let line = self.line();
            self.bump();
            let right = self.parse_multiplicative()?;
            left = ExprKind::Binop(op, Box::new(left), Box::new(right)).at(Some(line));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Times => BinOp::Mul,
                Token::Divide => BinOp::Div,
                _ => break,
            };
            let line = self.line();
            self.bump();
            let right = self.parse_unary()?;
            left = ExprKind::Binop(op, Box::new(left), Box::new(right)).at(Some(line));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if *self.current() == Token::Minus {
            let line = self.line();
            self.bump();
            let inner = self.parse_unary()?;
            return Ok(ExprKind::Uminus(Box::new(inner)).at(Some(line)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.line();
        match self.current().clone() {
            Token::Number(n) => {
                self.bump();
                Ok(ExprKind::Number(n).at(Some(line)))
            }
            Token::True => {
                self.bump();
                Ok(ExprKind::Boolean(true).at(Some(line)))
            }
            Token::False => {
                self.bump();
                Ok(ExprKind::Boolean(false).at(Some(line)))
            }
            Token::Ident(name) => {
                self.bump();
                if *self.current() == Token::LParen {
                    self.bump();
                    let mut args = Vec::new();
                    if *self.current() != Token::RParen {
                        args.push(self.parse_expression()?);
                        while *self.current() == Token::Comma {
                            self.bump();
                            args.push(self.parse_expression()?);
                        }
                    }
                    self.expect(&Token::RParen)?;
                    Ok(ExprKind::FuncCall(name, args).at(Some(line)))
                } else {
                    Ok(ExprKind::Identifier(name).at(Some(line)))
                }
            }
            Token::LParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::If => {
                self.bump();
                self.expect(&Token::LParen)?;
                let cond = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                self.expect(&Token::LBrace)?;
                let then_branch = self.parse_expression()?;
                self.expect(&Token::RBrace)?;
                self.expect(&Token::Else)?;
                self.expect(&Token::LBrace)?;
                let else_branch = self.parse_expression()?;
                self.expect(&Token::RBrace)?;
                Ok(ExprKind::If(Box::new(cond), Box::new(then_branch), Box::new(else_branch))
                    .at(Some(line)))
            }
            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_main() {
        let prog = parse("main() { x << 1 : num; x >> out; }").unwrap();
        assert_eq!(prog.functions.len(), 1);
        assert_eq!(prog.functions[0].name, "main");
        assert_eq!(prog.functions[0].body.stmts.len(), 2);
        assert!(prog.functions[0].body.tail.is_none());
    }

    #[test]
    fn parses_function_with_params_and_tail() {
        let prog = parse("f(a, b) { a + b }\nmain() { }").unwrap();
        let f = &prog.functions[0];
        assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
        assert!(f.body.tail.is_some());
    }

    #[test]
    fn precedence_and_binds_tighter_than_or() {
        let prog = parse("main() { x = true || false && true; }").unwrap();
        match &prog.functions[0].body.stmts[0].kind {
            StmtKind::Assign { expr, .. } => match &expr.kind {
                ExprKind::Binop(BinOp::Or, _, right) => {
                    assert!(matches!(right.kind, ExprKind::Binop(BinOp::And, _, _)));
                }
                other => panic!("expected top-level ||, got {other:?}"),
            },
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn if_expression_parses_both_branches() {
        let prog = parse("main() { x = if (true) { 1 } else { 2 }; }").unwrap();
        match &prog.functions[0].body.stmts[0].kind {
            StmtKind::Assign { expr, .. } => {
                assert!(matches!(expr.kind, ExprKind::If(..)));
            }
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn func_call_with_args_parses() {
        let prog = parse("f(a) { a }\nmain() { x = f(3); }").unwrap();
        match &prog.functions[1].body.stmts[0].kind {
            StmtKind::Assign { expr, .. } => match &expr.kind {
                ExprKind::FuncCall(name, args) => {
                    assert_eq!(name, "f");
                    assert_eq!(args.len(), 1);
                }
                other => panic!("expected call, got {other:?}"),
            },
            other => panic!("expected assign, got {other:?}"),
        }
    }

    #[test]
    fn illegal_character_reports_lexing_error() {
        let err = parse("main() { x = 1 @ 2; }").unwrap_err();
        assert!(matches!(err, SyntaxError::IllegalChar { ch: '@', .. }));
    }

    #[test]
    fn missing_semicolon_reports_syntax_error() {
        let err = parse("main() { x = 1 }").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    }
}
