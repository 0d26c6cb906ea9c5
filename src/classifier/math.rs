//! Constrained arithmetic evaluator.
//!
//! Accepts decimal literals, `+ - * /`, unary signs and parentheses. Anything
//! else is rejected. Arithmetic is exact decimal arithmetic.

use rust_decimal::Decimal;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 64;

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nested too deeply")]
    TooDeep,

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, MathError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(parse_number(&literal)?));
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    other => return Err(MathError::UnexpectedChar { found: other, offset }),
                };
                tokens.push(token);
                chars.next();
            }
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Decimal, MathError> {
    if literal == "." || literal.matches('.').count() > 1 {
        return Err(MathError::InvalidNumber(literal.to_string()));
    }
    let normalized = if literal.starts_with('.') {
        format!("0{literal}")
    } else {
        literal.trim_end_matches('.').to_string()
    };
    normalized
        .parse::<Decimal>()
        .map_err(|_| MathError::InvalidNumber(literal.to_string()))
}

/// Recursive-descent parser that evaluates while it parses.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), MathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }
        Ok(())
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Decimal, MathError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    let rhs = self.term()?;
                    value = value.checked_add(rhs).ok_or(MathError::Overflow)?;
                }
                Some(Token::Minus) => {
                    self.next();
                    let rhs = self.term()?;
                    value = value.checked_sub(rhs).ok_or(MathError::Overflow)?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Decimal, MathError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    let rhs = self.unary()?;
                    value = value.checked_mul(rhs).ok_or(MathError::Overflow)?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let rhs = self.unary()?;
                    if rhs.is_zero() {
                        return Err(MathError::DivisionByZero);
                    }
                    value = value.checked_div(rhs).ok_or(MathError::Overflow)?;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('+' | '-') unary | primary
    fn unary(&mut self) -> Result<Decimal, MathError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.next();
                self.descend()?;
                let value = self.unary();
                self.depth -= 1;
                value
            }
            Some(Token::Minus) => {
                self.next();
                self.descend()?;
                let value = self.unary().map(|v| -v);
                self.depth -= 1;
                value
            }
            _ => self.primary(),
        }
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<Decimal, MathError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(MathError::UnexpectedToken(other.to_string())),
                    None => Err(MathError::UnexpectedEnd),
                }
            }
            Some(other) => Err(MathError::UnexpectedToken(other.to_string())),
            None => Err(MathError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<Decimal, MathError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(MathError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some(extra) = parser.next() {
        return Err(MathError::UnexpectedToken(extra.to_string()));
    }

    Ok(value.normalize())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn adds_integers() {
        assert_eq!(evaluate("2 + 2"), Ok(dec!(4)));
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(dec!(14)));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(dec!(20)));
        assert_eq!(evaluate("10 - 4 - 3"), Ok(dec!(3)));
        assert_eq!(evaluate("100 / 10 / 5"), Ok(dec!(2)));
    }

    #[test]
    fn division_yields_decimals() {
        let value = evaluate("7 / 2").unwrap();
        assert_eq!(value, dec!(3.5));
        assert_eq!(value.to_string(), "3.5");
    }

    #[test]
    fn results_are_normalized() {
        assert_eq!(evaluate("2.50 * 2").unwrap().to_string(), "5");
        assert_eq!(evaluate("0.1 + 0.2").unwrap().to_string(), "0.3");
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 3"), Ok(dec!(-2)));
        assert_eq!(evaluate("2 * -3"), Ok(dec!(-6)));
        assert_eq!(evaluate("--4"), Ok(dec!(4)));
        assert_eq!(evaluate("+.5"), Ok(dec!(0.5)));
    }

    #[test]
    fn dangling_operator_is_an_error() {
        assert_eq!(evaluate("2 +"), Err(MathError::UnexpectedEnd));
        assert_eq!(evaluate("*"), Err(MathError::UnexpectedToken("'*'".into())));
    }

    #[test]
    fn rejects_non_arithmetic_characters() {
        assert!(matches!(
            evaluate("top-notch"),
            Err(MathError::UnexpectedChar { found: 't', offset: 0 })
        ));
        assert!(matches!(
            evaluate("2 ** 3"),
            Err(MathError::UnexpectedToken(_))
        ));
        assert!(matches!(
            evaluate("__import__('os')"),
            Err(MathError::UnexpectedChar { .. })
        ));
    }

    #[test]
    fn unbalanced_parentheses() {
        assert_eq!(evaluate("(1 + 2"), Err(MathError::UnexpectedEnd));
        assert_eq!(evaluate("1 + 2)"), Err(MathError::UnexpectedToken("')'".into())));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1 / 0"), Err(MathError::DivisionByZero));
        assert_eq!(evaluate("1 / (2 - 2)"), Err(MathError::DivisionByZero));
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(evaluate("1.2.3 + 1"), Err(MathError::InvalidNumber("1.2.3".into())));
        assert_eq!(evaluate(". + 1"), Err(MathError::InvalidNumber(".".into())));
    }

    #[test]
    fn empty_input() {
        assert_eq!(evaluate(""), Err(MathError::Empty));
        assert_eq!(evaluate("   "), Err(MathError::Empty));
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&deep), Err(MathError::TooDeep));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&shallow), Ok(dec!(1)));
    }

    #[test]
    fn overflow_is_reported() {
        let huge = "79228162514264337593543950335";
        assert_eq!(evaluate(&format!("{huge} * 10")), Err(MathError::Overflow));
    }
}
