//! Lexer/parser error types.
//!
//! `Display` renders exactly the diagnostic text spec.md §6 attributes to
//! this collaborator ("a `Syntax error ...` from the parser collaborator").

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("LEXING ERROR: Illegal character in line {line}: '{ch}'")]
    IllegalChar { line: u32, ch: char },

    #[error("Syntax error in (or just before) line {line} at symbol: '{symbol}'")]
    UnexpectedToken { line: u32, symbol: String },

    #[error("Syntax error: unexpected end of input")]
    UnexpectedEof,
}
