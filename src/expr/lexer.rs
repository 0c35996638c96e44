//! Tokenizer for formula source text.

use crate::error::CalcError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut chars = input.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some((idx, ch)) = chars.peek().copied() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            chars.next();
            continue;
        }

        match ch {
            '(' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::LParen,
                    pos: idx,
                });
            }
            ')' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::RParen,
                    pos: idx,
                });
            }
            ',' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Comma,
                    pos: idx,
                });
            }
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let start = idx;
                let mut out = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        // Backslash makes the next character literal; a
                        // trailing backslash leaves the string unterminated.
                        match chars.next() {
                            Some((_, esc)) => out.push(esc),
                            None => break,
                        }
                    } else {
                        out.push(c);
                    }
                }

                if !closed {
                    return Err(CalcError::LexError(format!(
                        "unterminated string literal starting at {start}"
                    )));
                }

                tokens.push(Token {
                    kind: TokenKind::Str(out),
                    pos: start,
                });
            }
            '0'..='9' | '-' => {
                let start = idx;
                let mut end = idx;
                if ch == '-' {
                    // A leading '-' only begins a number literal; the language
                    // has no unary minus over expressions and no infix
                    // subtraction, so '-' anywhere else is illegal.
                    chars.next();
                    match chars.peek().copied() {
                        Some((i, c)) if c.is_ascii_digit() => end = i,
                        _ => {
                            return Err(CalcError::LexError(format!(
                                "unexpected character '-' at {start}"
                            )))
                        }
                    }
                }
                let mut seen_dot = false;
                while let Some((i, c)) = chars.peek().copied() {
                    if c.is_ascii_digit() {
                        end = i;
                        chars.next();
                    } else if c == '.' && !seen_dot {
                        seen_dot = true;
                        end = i;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let raw = &input[start..=end];
                let n: f64 = raw.parse().map_err(|e| {
                    CalcError::LexError(format!("invalid number literal '{raw}' at {start}: {e}"))
                })?;
                if !n.is_finite() {
                    return Err(CalcError::LexError(format!(
                        "invalid number literal '{raw}' at {start}: out of range"
                    )));
                }
                tokens.push(Token {
                    kind: TokenKind::Number(n),
                    pos: start,
                });
            }
            c if is_ident_start(c) => {
                let start = idx;
                let mut end = idx;
                while let Some((i, cc)) = chars.peek().copied() {
                    if is_ident_continue(cc) {
                        end = i;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(input[start..=end].to_string()),
                    pos: start,
                });
            }
            _ => {
                return Err(CalcError::LexError(format!(
                    "unexpected character '{}' at {}",
                    ch, idx
                )))
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: input.len(),
    });
    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
