//! Lexing and parsing of program source text into [`mpcc_ast::Program`].
//!
//! Grounded on `Lexer.py`/`Parser.py`: a hand-rolled character lexer feeding
//! a recursive-descent parser whose precedence tiers mirror the original's
//! yacc precedence declarations. Kept as a separate crate from `mpcc-ast`
//! because the AST itself has no notion of source text -- only the front end
//! does.

mod error;
mod lexer;
mod parser;

pub use error::SyntaxError;
pub use lexer::{tokenize, Spanned, Token};
pub use parser::parse;
