//! Recursive-descent parser for where-expressions.
//!
//! ```text
//! expr      := and_expr (OR and_expr)*
//! and_expr  := not_expr (AND not_expr)*
//! not_expr  := NOT not_expr | predicate
//! predicate := '(' expr ')'
//!            | operand [ cmp operand | [NOT] IN '(' literal (',' literal)* ')' | IS [NOT] NULL ]
//! operand   := identifier | literal
//! literal   := ['-'] number | 'string' | TRUE | FALSE | NULL
//! ```

use crate::error::{EngineError, EngineResult};

use super::ast::{Expr, Literal, Operand};
use super::lexer::{tokenize, Token, TokenKind};

/// Parse a where-expression. Syntax errors carry the byte offset of the offending token.
pub fn parse(input: &str) -> EngineResult<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    if parser.peek().kind == TokenKind::Eof {
        return Err(EngineError::syntax(0, "empty expression"));
    }
    let expr = parser.parse_or()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(parser.unexpected(trailing));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with Eof and `pos` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> EngineResult<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            let tok = self.peek();
            Err(EngineError::syntax(
                tok.pos,
                format!("expected {what}, found {}", tok.describe()),
            ))
        }
    }

    fn unexpected(&self, tok: &Token) -> EngineError {
        EngineError::syntax(tok.pos, format!("unexpected token {}", tok.describe()))
    }

    fn parse_or(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_not()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> EngineResult<Expr> {
        if self.eat(&TokenKind::Not) {
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> EngineResult<Expr> {
        if self.eat(&TokenKind::LParen) {
            let inner = self.parse_or()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(inner);
        }

        let operand = self.parse_operand()?;
        match self.peek().kind.clone() {
            TokenKind::Cmp(op) => {
                self.advance();
                let right = self.parse_operand()?;
                Ok(Expr::Compare {
                    left: operand,
                    op,
                    right,
                })
            }
            TokenKind::In => {
                self.advance();
                let list = self.parse_list()?;
                Ok(Expr::InList {
                    operand,
                    list,
                    negated: false,
                })
            }
            TokenKind::Not => {
                self.advance();
                self.expect(TokenKind::In, "IN after NOT")?;
                let list = self.parse_list()?;
                Ok(Expr::InList {
                    operand,
                    list,
                    negated: true,
                })
            }
            TokenKind::Is => {
                self.advance();
                let negated = self.eat(&TokenKind::Not);
                self.expect(TokenKind::Null, "NULL")?;
                Ok(Expr::IsNull { operand, negated })
            }
            _ => Ok(Expr::Operand(operand)),
        }
    }

    fn parse_list(&mut self) -> EngineResult<Vec<Literal>> {
        self.expect(TokenKind::LParen, "'(' to open the IN list")?;
        let mut items = vec![self.parse_literal()?];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_literal()?);
        }
        self.expect(TokenKind::RParen, "')' to close the IN list")?;
        Ok(items)
    }

    fn parse_operand(&mut self) -> EngineResult<Operand> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            return Ok(Operand::Column(name));
        }
        self.parse_literal().map(Operand::Literal)
    }

    fn parse_literal(&mut self) -> EngineResult<Literal> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Number(text) => number_literal(&text, tok.pos, false),
            TokenKind::Minus => {
                let next = self.advance();
                match next.kind {
                    TokenKind::Number(text) => number_literal(&text, next.pos, true),
                    _ => Err(EngineError::syntax(
                        next.pos,
                        format!("expected a number after '-', found {}", next.describe()),
                    )),
                }
            }
            TokenKind::Str(s) => Ok(Literal::Str(s)),
            TokenKind::True => Ok(Literal::Bool(true)),
            TokenKind::False => Ok(Literal::Bool(false)),
            TokenKind::Null => Ok(Literal::Null),
            _ => Err(self.unexpected(&tok)),
        }
    }
}

fn number_literal(text: &str, pos: usize, negative: bool) -> EngineResult<Literal> {
    let signed = if negative {
        format!("-{text}")
    } else {
        text.to_string()
    };
    // Digit runs beyond i64 fall through to f64.
    if text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(v) = signed.parse::<i64>() {
            return Ok(Literal::Int(v));
        }
    }
    signed
        .parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| EngineError::syntax(pos, format!("malformed number '{text}'")))
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::expr::ast::{CmpOp, Expr, Literal, Operand};

    fn col(name: &str) -> Operand {
        Operand::Column(name.to_string())
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let e = parse("a = 1 OR b = 2 AND c = 3").unwrap();
        match e {
            Expr::Or(_, right) => assert!(matches!(*right, Expr::And(_, _))),
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn not_binds_tighter_than_and() {
        let e = parse("NOT a > 1 AND b").unwrap();
        match e {
            Expr::And(left, _) => assert!(matches!(*left, Expr::Not(_))),
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn negative_literals_and_in_lists() {
        let e = parse("amount NOT IN (-1, 2.5, 'x', NULL)").unwrap();
        assert_eq!(
            e,
            Expr::InList {
                operand: col("amount"),
                list: vec![
                    Literal::Int(-1),
                    Literal::Float(2.5),
                    Literal::Str("x".into()),
                    Literal::Null
                ],
                negated: true,
            }
        );
    }

    #[test]
    fn i64_min_is_representable() {
        let e = parse("x >= -9223372036854775808").unwrap();
        assert_eq!(
            e,
            Expr::Compare {
                left: col("x"),
                op: CmpOp::GtEq,
                right: Operand::Literal(Literal::Int(i64::MIN)),
            }
        );
    }

    #[test]
    fn digit_runs_beyond_i64_become_floats() {
        let e = parse("x < 100000000000000000000").unwrap();
        assert_eq!(
            e,
            Expr::Compare {
                left: col("x"),
                op: CmpOp::Lt,
                right: Operand::Literal(Literal::Float(1e20)),
            }
        );
        assert!(matches!(
            parse("x > -9223372036854775809").unwrap(),
            Expr::Compare { right: Operand::Literal(Literal::Float(v)), .. } if v < -9.2e18
        ));
    }

    #[test]
    fn is_not_null() {
        assert_eq!(
            parse("country IS NOT NULL").unwrap(),
            Expr::IsNull {
                operand: col("country"),
                negated: true
            }
        );
    }

    #[test]
    fn syntax_errors_point_at_the_token() {
        let cases = [
            ("amount > ", 9),
            ("(a = 1", 6),
            ("a = 1 b", 6),
            ("a IN 1", 5),
            ("", 0),
            ("a = = 1", 4),
        ];
        for (input, expected) in cases {
            match parse(input).unwrap_err() {
                crate::EngineError::Syntax { position, .. } => {
                    assert_eq!(position, expected, "input={input:?}")
                }
                other => panic!("unexpected error for {input:?}: {other}"),
            }
        }
    }
}
