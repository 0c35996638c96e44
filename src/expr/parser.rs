//! Recursive-descent parser and AST for formulas.

use serde_json::Value as JsonValue;

use crate::error::CalcError;

use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone)]
/// Formula AST node.
pub enum Expr {
    /// Literal value from a number or string token.
    Literal(JsonValue),
    /// Context reference path produced by `ref("a.b.c")`.
    Reference(String),
    /// Built-in function call.
    Call {
        /// Function name.
        name: String,
        /// Call argument expressions.
        args: Vec<Expr>,
    },
}

/// Parses a token stream into a single formula AST node.
///
/// The whole stream must be consumed; anything left after the root
/// expression is an error.
pub fn parse(tokens: &[Token]) -> Result<Expr, CalcError> {
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if !matches!(parser.current().kind, TokenKind::Eof) {
        return Err(CalcError::ParseError(format!(
            "unexpected trailing tokens at position {}",
            parser.current().pos
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_expr(&mut self) -> Result<Expr, CalcError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.pos += 1;
                Ok(Expr::Literal(super::value::number(n)?))
            }
            TokenKind::Str(ref s) => {
                self.pos += 1;
                Ok(Expr::Literal(JsonValue::String(s.clone())))
            }
            TokenKind::Ident(ref name) => {
                self.pos += 1;
                self.parse_call(name, token.pos)
            }
            TokenKind::Eof => Err(CalcError::ParseError(
                "unexpected end of input".to_string(),
            )),
            _ => Err(CalcError::ParseError(format!(
                "unexpected token {:?} at {}",
                token.kind, token.pos
            ))),
        }
    }

    /// Parses the argument list of `name(...)`.
    ///
    /// There are no free variables in the language, so a bare identifier is
    /// only valid as a function name followed by `(`.
    fn parse_call(&mut self, name: &str, pos: usize) -> Result<Expr, CalcError> {
        if self
            .consume_if(|k| matches!(k, TokenKind::LParen))
            .is_none()
        {
            return Err(CalcError::ParseError(format!(
                "expected '(' after function name '{name}' at {pos}"
            )));
        }

        let mut args = Vec::new();
        if self
            .consume_if(|k| matches!(k, TokenKind::RParen))
            .is_none()
        {
            loop {
                args.push(self.parse_expr()?);
                if self
                    .consume_if(|k| matches!(k, TokenKind::Comma))
                    .is_some()
                {
                    continue;
                }
                if self
                    .consume_if(|k| matches!(k, TokenKind::RParen))
                    .is_some()
                {
                    break;
                }
                if matches!(self.current().kind, TokenKind::Eof) {
                    return Err(CalcError::ParseError(
                        "unexpected end of input in argument list".to_string(),
                    ));
                }
                return Err(CalcError::ParseError(format!(
                    "expected ',' or ')' in argument list at {}",
                    self.current().pos
                )));
            }
        }

        if name == "ref" {
            return build_reference(args, pos);
        }

        Ok(Expr::Call {
            name: name.to_string(),
            args,
        })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn consume_if(&mut self, predicate: fn(&TokenKind) -> bool) -> Option<&Token> {
        if predicate(&self.current().kind) {
            let current = &self.tokens[self.pos];
            self.pos += 1;
            Some(current)
        } else {
            None
        }
    }
}

/// Validates the `ref(...)` shape at parse time: exactly one argument, and it
/// must be a string literal. Anything else never reaches evaluation.
fn build_reference(args: Vec<Expr>, pos: usize) -> Result<Expr, CalcError> {
    if args.len() != 1 {
        return Err(CalcError::ParseError(format!(
            "ref() at {pos} expects exactly one argument, got {}",
            args.len()
        )));
    }
    match args.into_iter().next() {
        Some(Expr::Literal(JsonValue::String(path))) => Ok(Expr::Reference(path)),
        _ => Err(CalcError::ParseError(format!(
            "ref() argument at {pos} must be a string literal"
        ))),
    }
}
