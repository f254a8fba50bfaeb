//! Arithmetic evaluation for the CALC action.
//!
//! A small recursive-descent parser over `+ - * / %`, parentheses, and unary
//! sign.  Input comes from a language model transcribing speech, so the
//! preprocessor also normalizes decimal commas ("2,5" → "2.5") and strips
//! whitespace.  Percentage requests arrive pre-split by the dispatcher
//! (`"15%:2500"`), so `%` inside an expression is plain modulo.

use thiserror::Error;

// ---------------------------------------------------------------------------
// CalcError
// ---------------------------------------------------------------------------

/// Errors from expression evaluation.
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid expression: {0}")]
    Invalid(String),

    #[error("division by zero")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// Calculator trait
// ---------------------------------------------------------------------------

/// Calculation capability consumed by the CALC action.
pub trait Calculator: Send + Sync {
    /// Evaluate an arithmetic expression.
    fn evaluate(&self, expr: &str) -> Result<f64, CalcError>;

    /// `percent` percent of `value`.
    fn percentage(&self, percent: f64, value: f64) -> f64;

    /// Format a result for display: whole numbers without decimals,
    /// otherwise up to two decimal places with trailing zeros trimmed.
    fn format(&self, value: f64) -> String;
}

// ---------------------------------------------------------------------------
// ExprCalculator
// ---------------------------------------------------------------------------

/// The default [`Calculator`].
pub struct ExprCalculator;

impl ExprCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExprCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for ExprCalculator {
    fn evaluate(&self, expr: &str) -> Result<f64, CalcError> {
        let normalized: String = expr
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        if normalized.is_empty() {
            return Err(CalcError::Invalid("empty expression".into()));
        }

        let mut parser = Parser::new(&normalized);
        let value = parser.expression()?;
        if parser.pos < parser.chars.len() {
            return Err(CalcError::Invalid(format!(
                "unexpected trailing input at position {}",
                parser.pos
            )));
        }
        Ok(value)
    }

    fn percentage(&self, percent: f64, value: f64) -> f64 {
        value * percent / 100.0
    }

    fn format(&self, value: f64) -> String {
        if value == value.trunc() && value.abs() < 1e15 {
            return format!("{value:.0}");
        }
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Grammar:
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/' | '%') factor)*
/// factor     := ('-' | '+') factor | primary
/// primary    := number | '(' expression ')'
/// ```
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn expression(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.bump();
                    value += self.term()?;
                }
                '-' => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.bump();
                    value *= self.factor()?;
                }
                '/' => {
                    self.bump();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= rhs;
                }
                '%' => {
                    self.bump();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value %= rhs;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some('-') => {
                self.bump();
                Ok(-self.factor()?)
            }
            Some('+') => {
                self.bump();
                self.factor()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some('(') => {
                self.bump();
                let value = self.expression()?;
                match self.bump() {
                    Some(')') => Ok(value),
                    _ => Err(CalcError::Invalid("missing closing parenthesis".into())),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(CalcError::Invalid(format!("unexpected character '{c}'"))),
            None => Err(CalcError::Invalid("unexpected end of expression".into())),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                self.bump();
            } else {
                break;
            }
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| CalcError::Invalid(format!("bad number '{literal}'")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> f64 {
        ExprCalculator::new().evaluate(expr).expect(expr)
    }

    #[test]
    fn addition() {
        assert_eq!(eval("2+2"), 4.0);
    }

    #[test]
    fn precedence_multiplication_before_addition() {
        assert_eq!(eval("2+3*4"), 14.0);
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(eval("(2+3)*4"), 20.0);
    }

    #[test]
    fn division_and_fractions() {
        assert_eq!(eval("10/4"), 2.5);
    }

    #[test]
    fn modulo() {
        assert_eq!(eval("10%3"), 1.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval("-5+3"), -2.0);
        assert_eq!(eval("2*-3"), -6.0);
    }

    #[test]
    fn whitespace_and_decimal_commas_are_normalized() {
        assert_eq!(eval(" 2,5 + 1 "), 3.5);
    }

    #[test]
    fn nested_parentheses() {
        assert_eq!(eval("((1+2)*(3+4))"), 21.0);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let calc = ExprCalculator::new();
        assert!(matches!(calc.evaluate("1/0"), Err(CalcError::DivisionByZero)));
        assert!(matches!(calc.evaluate("5%0"), Err(CalcError::DivisionByZero)));
    }

    #[test]
    fn garbage_is_an_error() {
        let calc = ExprCalculator::new();
        assert!(calc.evaluate("abc").is_err());
        assert!(calc.evaluate("2+").is_err());
        assert!(calc.evaluate("2+2x").is_err());
        assert!(calc.evaluate("").is_err());
        assert!(calc.evaluate("(2+2").is_err());
    }

    #[test]
    fn percentage() {
        let calc = ExprCalculator::new();
        assert_eq!(calc.percentage(15.0, 2500.0), 375.0);
        assert_eq!(calc.percentage(50.0, 10.0), 5.0);
    }

    #[test]
    fn format_whole_numbers_without_decimals() {
        let calc = ExprCalculator::new();
        assert_eq!(calc.format(375.0), "375");
        assert_eq!(calc.format(-2.0), "-2");
    }

    #[test]
    fn format_trims_trailing_zeros() {
        let calc = ExprCalculator::new();
        assert_eq!(calc.format(2.5), "2.5");
        assert_eq!(calc.format(2.50), "2.5");
        assert_eq!(calc.format(1.0 / 3.0), "0.33");
    }
}
