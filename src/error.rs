//! Error definitions for all formula engine stages.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
pub enum CalcError {
    /// Tokenizer failure (illegal character, unterminated string, bad number).
    #[error("lex error: {0}")]
    LexError(String),
    /// Parser failure (malformed call syntax, bad `ref()` shape, trailing tokens).
    #[error("parse error: {0}")]
    ParseError(String),
    /// Evaluation failure (unknown function, non-numeric operand, division by zero).
    #[error("eval error: {0}")]
    EvalError(String),
}
