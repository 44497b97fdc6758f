//! A small hand-rolled lexer, grounded on `Lexer.py`'s token set.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(i64),
    Ident(String),

    If,
    Else,
    Leak,
    Main,
    True,
    False,
    Bool,
    Num,

    Plus,
    Minus,
    Times,
    Divide,
    And,
    Or,
    Not,
    Assign,
    InputArrow,
    OutputArrow,
    Equals,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,

    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Semicolon,
    Comma,

    Eof,
}

/// A token paired with the 1-based source line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

fn keyword(ident: &str) -> Option<Token> {
    Some(match ident {
        "if" => Token::If,
        "else" => Token::Else,
        "leak" => Token::Leak,
        "main" => Token::Main,
        "true" => Token::True,
        "false" => Token::False,
        "bool" => Token::Bool,
        "num" => Token::Num,
        _ => return None,
    })
}

/// Tokenizes the whole input up front, returning an error at the first
/// illegal character (lexing is not report-all; it matches §7's
/// first-error-per-pass discipline).
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let is_eof = spanned.token == Token::Eof;
        tokens.push(spanned);
        if is_eof {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat_if(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Spanned, SyntaxError> {
        loop {
            match self.peek() {
                Some(c) if c == ' ' || c == '\t' || c == '\n' || c == '\r' => {
                    self.bump();
                }
                _ => break,
            }
        }

        let line = self.line;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(Spanned { token: Token::Eof, line }),
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Times,
            '/' => Token::Divide,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            ',' => Token::Comma,
            '&' if self.eat_if('&') => Token::And,
            '|' if self.eat_if('|') => Token::Or,
            '!' if self.eat_if('=') => Token::Neq,
            '!' => Token::Not,
            '=' if self.eat_if('=') => Token::Equals,
            '=' => Token::Assign,
            '<' if self.eat_if('<') => Token::InputArrow,
            '<' if self.eat_if('=') => Token::Lte,
            '<' => Token::Lt,
            '>' if self.eat_if('>') => Token::OutputArrow,
            '>' if self.eat_if('=') => Token::Gte,
            '>' => Token::Gt,
            c if c.is_ascii_digit() => {
                let mut value = String::new();
                value.push(c);
                while let Some(d) = self.peek() {
                    if d.is_ascii_digit() {
                        value.push(d);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Token::Number(value.parse().expect("digit-only lexeme parses as i64"))
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                ident.push(c);
                while let Some(d) = self.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        self.bump();
                    } else {
                        break;
                    }
                }
                keyword(&ident).unwrap_or(Token::Ident(ident))
            }
            other => return Err(SyntaxError::IllegalChar { line, ch: other }),
        };

        Ok(Spanned { token, line })
    }
}
