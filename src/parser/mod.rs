mod grammar;
mod lexer;
mod types;

pub use grammar::{Parser, MAX_NESTING};
pub use lexer::tokenize;
pub use types::{BinaryOp, Expr, Source, Span, Stmt, StmtKind, Token, TokenKind, UnaryOp};

use crate::error::SyntaxError;

/// Parse a whole script or debugger fragment into statements.
pub fn parse_program(source: &Source) -> Result<Vec<Stmt>, SyntaxError> {
    let tokens = tokenize(source)?;
    Parser::new(source, tokens).parse_program()
}
