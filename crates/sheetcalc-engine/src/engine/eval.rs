//! Formula evaluation.
//!
//! Uses the classic two-stack algorithm: one stack of operand values and one
//! of pending operators. Multiplicative operators are applied as soon as
//! their right operand is known; additive operators wait until the next
//! additive operator, a `)` or the end of input. Both rules resolve equal
//! precedence left to right.
//!
//! Evaluation never fails through a panic or an early return from the
//! caller's point of view: the result is either a number or an [`EvalError`]
//! value that the caller can store.

use thiserror::Error;

use super::formula::{Formula, FormulaFormatError, Operator, Token};
use super::name::NameRules;

/// Why a formula produced no number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivideByZero,

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("{0} does not hold a number")]
    NonNumeric(String),

    #[error("{0} holds an error")]
    ErrorReference(String),
}

impl EvalError {
    /// Human-readable reason, suitable for display in a cell.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Failure of [`evaluate_expression`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error(transparent)]
    Format(#[from] FormulaFormatError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Op(Operator),
    LParen,
}

struct Stacks {
    values: Vec<f64>,
    ops: Vec<Pending>,
}

impl Stacks {
    fn top_is(&self, pred: impl Fn(Operator) -> bool) -> bool {
        matches!(self.ops.last(), Some(Pending::Op(op)) if pred(*op))
    }

    fn pop_value(&mut self) -> f64 {
        self.values
            .pop()
            .expect("validated formula always leaves an operand on the stack")
    }

    fn pop_op(&mut self) -> Operator {
        match self.ops.pop() {
            Some(Pending::Op(op)) => op,
            other => unreachable!("expected a pending operator, found {other:?}"),
        }
    }

    /// Push an operand, first folding it into a pending `*` or `/`.
    fn push_operand(&mut self, value: f64) -> Result<(), EvalError> {
        if self.top_is(Operator::is_multiplicative) {
            let op = self.pop_op();
            let prev = self.pop_value();
            self.values.push(apply(op, prev, value)?);
        } else {
            self.values.push(value);
        }
        Ok(())
    }

    /// Apply a pending `+` or `-` to the top two operands.
    fn resolve_additive(&mut self) -> Result<(), EvalError> {
        if self.top_is(|op| !op.is_multiplicative()) {
            let op = self.pop_op();
            let value = self.pop_value();
            let prev = self.pop_value();
            self.values.push(apply(op, prev, value)?);
        }
        Ok(())
    }
}

/// `prev op value`, keeping left-to-right operand order.
fn apply(op: Operator, prev: f64, value: f64) -> Result<f64, EvalError> {
    match op {
        Operator::Add => Ok(prev + value),
        Operator::Sub => Ok(prev - value),
        Operator::Mul => Ok(prev * value),
        Operator::Div if value == 0.0 => Err(EvalError::DivideByZero),
        Operator::Div => Ok(prev / value),
    }
}

impl Formula {
    /// Evaluate against `lookup`, which resolves a normalized variable name to
    /// its value or reports why it cannot.
    pub fn evaluate<F>(&self, mut lookup: F) -> Result<f64, EvalError>
    where
        F: FnMut(&str) -> Result<f64, EvalError>,
    {
        let mut stacks = Stacks {
            values: Vec::new(),
            ops: Vec::new(),
        };

        for token in self.tokens() {
            match token {
                Token::Number(n) => stacks.push_operand(*n)?,
                Token::Variable(name) => stacks.push_operand(lookup(name)?)?,
                Token::Op(op) if op.is_multiplicative() => stacks.ops.push(Pending::Op(*op)),
                Token::Op(op) => {
                    stacks.resolve_additive()?;
                    stacks.ops.push(Pending::Op(*op));
                }
                Token::LParen => stacks.ops.push(Pending::LParen),
                Token::RParen => {
                    stacks.resolve_additive()?;
                    match stacks.ops.pop() {
                        Some(Pending::LParen) => {}
                        other => unreachable!("validated formula has balanced parentheses, found {other:?}"),
                    }
                    if stacks.top_is(Operator::is_multiplicative) {
                        let value = stacks.pop_value();
                        stacks.push_operand(value)?;
                    }
                }
            }
        }

        if stacks.ops.is_empty() {
            return Ok(stacks.pop_value());
        }
        let op = stacks.pop_op();
        let value = stacks.pop_value();
        let prev = stacks.pop_value();
        apply(op, prev, value)
    }
}

/// Parse and evaluate a self-contained expression in one step.
///
/// Variables are normalized and checked with `rules`, then resolved through
/// `lookup`.
pub fn evaluate_expression<F>(source: &str, rules: &NameRules, lookup: F) -> Result<f64, ExprError>
where
    F: FnMut(&str) -> Result<f64, EvalError>,
{
    let formula = Formula::parse_with(source, rules)?;
    Ok(formula.evaluate(lookup)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars(name: &str) -> Result<f64, EvalError> {
        Err(EvalError::UndefinedVariable(name.to_string()))
    }

    fn eval(source: &str) -> Result<f64, EvalError> {
        Formula::parse(source).unwrap().evaluate(no_vars)
    }

    #[test]
    fn test_single_operand() {
        assert_eq!(eval("5"), Ok(5.0));
        assert_eq!(eval("(((7)))"), Ok(7.0));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*5+(3+4*8)*5+2"), Ok(194.0));
        assert_eq!(eval("2+6*3"), Ok(20.0));
        assert_eq!(eval("2*6+3"), Ok(15.0));
        assert_eq!(eval("(2+6)*3"), Ok(24.0));
        assert_eq!(eval("2*(3+5)"), Ok(16.0));
        assert_eq!(eval("(1+1)*(2+2)"), Ok(8.0));
    }

    #[test]
    fn test_left_to_right_for_equal_precedence() {
        assert_eq!(eval("1-2-3"), Ok(-4.0));
        assert_eq!(eval("8/2/2"), Ok(2.0));
        assert_eq!(eval("8/2*4"), Ok(16.0));
        assert_eq!(eval("10-4+3"), Ok(9.0));
        assert_eq!(eval("20/(2*5)/2"), Ok(1.0));
    }

    #[test]
    fn test_nested_parentheses() {
        assert_eq!(eval("((2+3)*(4-1))/5"), Ok(3.0));
        assert_eq!(eval("2*(3*(4+1))"), Ok(30.0));
        assert_eq!(eval("(1+(2+(3+4)))-10"), Ok(0.0));
    }

    #[test]
    fn test_fractional_arithmetic() {
        assert_eq!(eval("5/2"), Ok(2.5));
        assert_eq!(eval("0.5 + .25"), Ok(0.75));
    }

    #[test]
    fn test_divide_by_zero_is_a_value() {
        assert_eq!(eval("2/0"), Err(EvalError::DivideByZero));
        assert_eq!(eval("1/(3-3)"), Err(EvalError::DivideByZero));
        assert_eq!(eval("2/0").unwrap_err().reason(), "division by zero");
        // zero numerator is fine
        assert_eq!(eval("0/4"), Ok(0.0));
    }

    #[test]
    fn test_variables_use_lookup() {
        let f = Formula::parse("x * (y + 1)").unwrap();
        let value = f.evaluate(|name| match name {
            "x" => Ok(3.0),
            "y" => Ok(4.0),
            _ => no_vars(name),
        });
        assert_eq!(value, Ok(15.0));
    }

    #[test]
    fn test_lookup_failure_becomes_error() {
        let f = Formula::parse("1 + missing").unwrap();
        assert_eq!(
            f.evaluate(no_vars),
            Err(EvalError::UndefinedVariable("missing".to_string()))
        );
    }

    #[test]
    fn test_lookup_sees_normalized_names() {
        let rules = NameRules::new(|s| s.to_lowercase(), |_| true);
        let value = evaluate_expression("A + B", &rules, |name| match name {
            "a" => Ok(1.0),
            "b" => Ok(2.0),
            _ => no_vars(name),
        });
        assert_eq!(value, Ok(3.0));
    }

    #[test]
    fn test_evaluate_expression_reports_format_errors() {
        let err = evaluate_expression("1 +", &NameRules::default(), no_vars).unwrap_err();
        assert!(matches!(err, ExprError::Format(_)));
        let err = evaluate_expression("1/0", &NameRules::default(), no_vars).unwrap_err();
        assert_eq!(err, ExprError::Eval(EvalError::DivideByZero));
    }
}
