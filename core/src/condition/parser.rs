use super::lexer::{tokenize, Token};
use crate::Value;
use std::ops::Range;

/// Is a comparison operator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

/// Is the syntax tree of a condition.
#[derive(Clone, PartialEq, Debug)]
pub(super) enum Expr {
    Literal(Value),
    Field(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(Box<Expr>, Comparison, Box<Expr>),
}

/// Is a recursive descent parser over the tokens of a condition:
///
/// ```text
/// or         := and ("or" and)*
/// and        := not ("and" not)*
/// not        := "not" not | comparison
/// comparison := operand (op operand)?
/// operand    := literal | identifier | "(" or ")"
/// ```
struct Parser {
    tokens: Vec<(Token, Range<usize>)>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).map(|(token, _)| token.clone());
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn unexpected(&self, expected: &str) -> String {
        match self.tokens.get(self.position) {
            Some((token, span)) => format!(
                "expected {}, found `{}` at position {}",
                expected, token, span.start
            ),
            None => format!("expected {}, found end of input", expected),
        }
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut left = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut left = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let left = self.operand()?;
        let op = match self.peek() {
            Some(Token::Eq) => Comparison::Eq,
            Some(Token::Ne) => Comparison::Ne,
            Some(Token::Lt) => Comparison::Lt,
            Some(Token::Le) => Comparison::Le,
            Some(Token::Gt) => Comparison::Gt,
            Some(Token::Ge) => Comparison::Ge,
            Some(Token::In) => Comparison::In,
            Some(Token::Not) => {
                self.advance();
                if self.peek() != Some(&Token::In) {
                    return Err(self.unexpected("`in` after `not`"));
                }
                Comparison::NotIn
            }
            _ => return Ok(left),
        };
        self.advance();
        let right = self.operand()?;
        Ok(Expr::Compare(Box::new(left), op, Box::new(right)))
    }

    fn operand(&mut self) -> Result<Expr, String> {
        let expr = match self.peek() {
            Some(Token::Open) => {
                self.advance();
                let inner = self.or()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(self.unexpected("`)`"));
                }
                inner
            }
            Some(Token::Int(i)) => Expr::Literal(Value::from(*i)),
            Some(Token::Float(x)) => Expr::Literal(Value::from(*x)),
            Some(Token::Str(s)) => Expr::Literal(Value::from(s.as_str())),
            Some(Token::Bool(b)) => Expr::Literal(Value::from(*b)),
            Some(Token::Null) => Expr::Literal(Value::Null),
            Some(Token::Ident(name)) => Expr::Field(name.clone()),
            _ => return Err(self.unexpected("an operand")),
        };
        self.advance();
        Ok(expr)
    }
}

/// Parses `source` into an expression, or returns the reason it is malformed.
pub(super) fn parse(source: &str) -> Result<Expr, String> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        position: 0,
    };
    let expr = parser.or()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: impl Into<Value>) -> Box<Expr> {
        Box::new(Expr::Literal(value.into()))
    }

    fn field(name: &str) -> Box<Expr> {
        Box::new(Expr::Field(name.to_string()))
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            Expr::Compare(field("A.id"), Comparison::Eq, field("B.id")),
            parse("A.id == B.id").unwrap()
        );
        assert_eq!(
            Expr::Compare(lit("a"), Comparison::NotIn, field("name")),
            parse("'a' not in name").unwrap()
        );
    }

    #[test]
    fn test_precedence() {
        // `and` binds tighter than `or`:
        assert_eq!(
            Expr::Or(
                Box::new(Expr::Literal(true.into())),
                Box::new(Expr::And(lit(false), lit(false)))
            ),
            parse("true or false and false").unwrap()
        );
        // `not` applies to the comparison:
        assert_eq!(
            Expr::Not(Box::new(Expr::Compare(lit(1), Comparison::Gt, lit(2)))),
            parse("not 1 > 2").unwrap()
        );
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            Expr::And(
                Box::new(Expr::Or(lit(true), lit(false))),
                Box::new(Expr::Compare(lit(1), Comparison::Le, lit(1.5)))
            ),
            parse("(true or (false)) and (1 <= 1.5)").unwrap()
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Err("expected an operand, found end of input".to_string()),
            parse("")
        );
        assert_eq!(
            Err("expected an operand, found end of input".to_string()),
            parse("1 <")
        );
        assert_eq!(
            Err("expected `)`, found end of input".to_string()),
            parse("(1 < 2")
        );
        assert_eq!(
            Err("expected end of input, found `3` at position 6".to_string()),
            parse("1 < 2 3")
        );
        assert_eq!(
            Err("expected `in` after `not`, found `'a'` at position 9".to_string()),
            parse("name not 'a'")
        );
        assert!(parse("1 < 2 < 3").is_err());
    }
}
