//! Tokenizer for where-expressions. Every token carries the byte offset it starts at.

use crate::error::{EngineError, EngineResult};

use super::ast::CmpOp;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Bare or double-quoted identifier.
    Ident(String),
    /// Unsigned numeric text, parsed by the parser so a leading minus can fold in.
    Number(String),
    /// Single-quoted string with `''` unescaped.
    Str(String),
    Cmp(CmpOp),
    Minus,
    LParen,
    RParen,
    Comma,
    And,
    Or,
    Not,
    In,
    Is,
    Null,
    True,
    False,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    /// Source-like rendering for error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(s) => format!("'{s}'"),
            TokenKind::Number(s) => format!("'{s}'"),
            TokenKind::Str(s) => format!("string '{s}'"),
            TokenKind::Cmp(op) => format!("'{}'", op.symbol()),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::And => "'AND'".to_string(),
            TokenKind::Or => "'OR'".to_string(),
            TokenKind::Not => "'NOT'".to_string(),
            TokenKind::In => "'IN'".to_string(),
            TokenKind::Is => "'IS'".to_string(),
            TokenKind::Null => "'NULL'".to_string(),
            TokenKind::True => "'TRUE'".to_string(),
            TokenKind::False => "'FALSE'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

pub(crate) fn tokenize(input: &str) -> EngineResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let kind = match c {
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'-' => {
                i += 1;
                TokenKind::Minus
            }
            b'=' => {
                i += if bytes.get(i + 1) == Some(&b'=') { 2 } else { 1 };
                TokenKind::Cmp(CmpOp::Eq)
            }
            b'!' => {
                if bytes.get(i + 1) != Some(&b'=') {
                    return Err(EngineError::syntax(start, "unexpected character '!'"));
                }
                i += 2;
                TokenKind::Cmp(CmpOp::NotEq)
            }
            b'<' => match bytes.get(i + 1) {
                Some(b'=') => {
                    i += 2;
                    TokenKind::Cmp(CmpOp::LtEq)
                }
                Some(b'>') => {
                    i += 2;
                    TokenKind::Cmp(CmpOp::NotEq)
                }
                _ => {
                    i += 1;
                    TokenKind::Cmp(CmpOp::Lt)
                }
            },
            b'>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    TokenKind::Cmp(CmpOp::GtEq)
                } else {
                    i += 1;
                    TokenKind::Cmp(CmpOp::Gt)
                }
            }
            b'\'' => {
                let (text, next) = quoted(input, start, b'\'')
                    .ok_or_else(|| EngineError::syntax(start, "unterminated string literal"))?;
                i = next;
                TokenKind::Str(text)
            }
            b'"' => {
                let (text, next) = quoted(input, start, b'"')
                    .ok_or_else(|| EngineError::syntax(start, "unterminated quoted identifier"))?;
                i = next;
                TokenKind::Ident(text)
            }
            b'0'..=b'9' | b'.' => {
                let end = number_end(bytes, i);
                if end == i || !bytes[i..end].iter().any(u8::is_ascii_digit) {
                    return Err(EngineError::syntax(start, "malformed number"));
                }
                i = end;
                TokenKind::Number(input[start..end].to_string())
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                keyword_or_ident(&input[start..i])
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(EngineError::syntax(
                    start,
                    format!("unexpected character '{ch}'"),
                ));
            }
        };
        tokens.push(Token { kind, pos: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: input.len(),
    });
    Ok(tokens)
}

fn keyword_or_ident(word: &str) -> TokenKind {
    match word.to_ascii_uppercase().as_str() {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "IN" => TokenKind::In,
        "IS" => TokenKind::Is,
        "NULL" => TokenKind::Null,
        "TRUE" => TokenKind::True,
        "FALSE" => TokenKind::False,
        _ => TokenKind::Ident(word.to_string()),
    }
}

/// Scan a quoted run starting at `start` (the opening quote). A doubled quote is an escaped quote.
/// Returns the unescaped text and the offset just past the closing quote.
fn quoted(input: &str, start: usize, quote: u8) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let mut out = String::new();
    let mut i = start + 1;
    let mut run_start = i;
    while i < bytes.len() {
        if bytes[i] == quote {
            out.push_str(&input[run_start..i]);
            if bytes.get(i + 1) == Some(&quote) {
                out.push(quote as char);
                i += 2;
                run_start = i;
                continue;
            }
            return Some((out, i + 1));
        }
        i += 1;
    }
    None
}

/// `digits [. digits] [e [+-] digits]`, where either side of the point may be empty.
fn number_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::{tokenize, TokenKind};
    use crate::expr::ast::CmpOp;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators_and_aliases() {
        assert_eq!(
            kinds("a == 1 <> 2 != 3 >= 4"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Cmp(CmpOp::Eq),
                TokenKind::Number("1".into()),
                TokenKind::Cmp(CmpOp::NotEq),
                TokenKind::Number("2".into()),
                TokenKind::Cmp(CmpOp::NotEq),
                TokenKind::Number("3".into()),
                TokenKind::Cmp(CmpOp::GtEq),
                TokenKind::Number("4".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_and_quoted_identifiers_unescape() {
        assert_eq!(
            kinds("\"my col\" = 'it''s'"),
            vec![
                TokenKind::Ident("my col".into()),
                TokenKind::Cmp(CmpOp::Eq),
                TokenKind::Str("it's".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("not x In (1) and y is Null"),
            vec![
                TokenKind::Not,
                TokenKind::Ident("x".into()),
                TokenKind::In,
                TokenKind::LParen,
                TokenKind::Number("1".into()),
                TokenKind::RParen,
                TokenKind::And,
                TokenKind::Ident("y".into()),
                TokenKind::Is,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn errors_carry_byte_positions() {
        match tokenize("a = 'open").unwrap_err() {
            crate::EngineError::Syntax { position, .. } => assert_eq!(position, 4),
            other => panic!("unexpected error: {other}"),
        }
        match tokenize("a ! b").unwrap_err() {
            crate::EngineError::Syntax { position, .. } => assert_eq!(position, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn numbers_with_exponents() {
        assert_eq!(kinds("1.5e-3")[0], TokenKind::Number("1.5e-3".into()));
        assert_eq!(kinds(".5")[0], TokenKind::Number(".5".into()));
    }
}
