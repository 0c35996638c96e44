//! Formula language used to compute derived field values.

/// Expression evaluator.
pub mod eval;
/// Built-in function library.
pub mod functions;
/// Tokenizer for formula source text.
pub mod lexer;
/// Parser and formula AST definitions.
pub mod parser;
/// Coercion and truthiness rules shared across the engine.
pub mod value;

use crate::error::CalcError;

/// Parses formula source into an AST.
pub fn parse_expression(input: &str) -> Result<parser::Expr, CalcError> {
    let tokens = lexer::tokenize(input)?;
    parser::parse(&tokens)
}
