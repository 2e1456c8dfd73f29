//! Validated infix formulas.
//!
//! A [`Formula`] is built once from source text and is immutable afterwards.
//! Construction tokenizes the source, normalizes every identifier with the
//! caller's [`NameRules`] and checks the infix grammar:
//!
//! - at least one token;
//! - the first token is a number, variable or `(`, the last a number,
//!   variable or `)`;
//! - a `)` never closes more parentheses than were opened, and the totals
//!   match at the end;
//! - `(` and operators are followed by a number, variable or `(`;
//! - numbers, variables and `)` are followed by an operator or `)`;
//! - every normalized variable is an identifier accepted by the rules.
//!
//! Either every check passes or no formula is produced.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use super::name::{NameRules, is_identifier};
use super::token::{RawToken, TokenKind, tokenize};

/// The four arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }
}

/// A normalized formula token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Variable(String),
    Op(Operator),
    LParen,
    RParen,
}

impl Token {
    /// Numbers, variables and `(` may start an operand.
    fn opens_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_) | Token::LParen)
    }

    /// Numbers, variables and `)` may end an operand.
    fn closes_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_) | Token::RParen)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `inf` would read back as a variable
            Token::Number(n) if n.is_infinite() => f.write_str("1e999"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Variable(name) => f.write_str(name),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// Malformed formula text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid formula: {reason}")]
pub struct FormulaFormatError {
    reason: String,
}

impl FormulaFormatError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        FormulaFormatError {
            reason: reason.into(),
        }
    }

    /// Human-readable description of the problem.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// An immutable, grammatically valid formula.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Vec<Token>,
}

impl Formula {
    /// Parse with identity normalization and no extra name restrictions.
    pub fn parse(source: &str) -> Result<Formula, FormulaFormatError> {
        Formula::parse_with(source, &NameRules::default())
    }

    /// Parse, normalizing every variable with `rules` and requiring each
    /// normalized variable to pass `rules`' validity predicate.
    pub fn parse_with(source: &str, rules: &NameRules) -> Result<Formula, FormulaFormatError> {
        let tokens = tokenize(source)
            .map(|raw| normalize_token(raw, rules))
            .collect::<Result<Vec<_>, _>>()?;

        let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
            return Err(FormulaFormatError::new("formula cannot be empty"));
        };
        if !first.opens_operand() {
            return Err(FormulaFormatError::new(format!(
                "formula cannot start with '{first}'"
            )));
        }
        if !last.closes_operand() {
            return Err(FormulaFormatError::new(format!(
                "formula cannot end with '{last}'"
            )));
        }

        let mut open = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LParen => open += 1,
                Token::RParen => {
                    open = open.checked_sub(1).ok_or_else(|| {
                        FormulaFormatError::new(format!(
                            "unmatched ')' at token {}",
                            i + 1
                        ))
                    })?;
                }
                _ => {}
            }

            let Some(next) = tokens.get(i + 1) else {
                continue;
            };
            if matches!(token, Token::LParen | Token::Op(_)) && !next.opens_operand() {
                return Err(FormulaFormatError::new(format!(
                    "'{next}' cannot follow '{token}'"
                )));
            }
            if token.closes_operand() && !matches!(next, Token::Op(_) | Token::RParen) {
                return Err(FormulaFormatError::new(format!(
                    "'{next}' cannot follow '{token}'"
                )));
            }
        }
        if open != 0 {
            return Err(FormulaFormatError::new(format!(
                "{open} unclosed '(' in formula"
            )));
        }

        Ok(Formula { tokens })
    }

    /// The normalized token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Distinct normalized variables, in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let Token::Variable(name) = token
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }
}

fn normalize_token(raw: RawToken<'_>, rules: &NameRules) -> Result<Token, FormulaFormatError> {
    match raw.kind {
        TokenKind::LParen => Ok(Token::LParen),
        TokenKind::RParen => Ok(Token::RParen),
        TokenKind::Operator => Operator::from_symbol(raw.text)
            .map(Token::Op)
            .ok_or_else(|| FormulaFormatError::new(format!("unknown operator '{raw}'"))),
        TokenKind::Number => raw
            .text
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| FormulaFormatError::new(format!("invalid number '{raw}'"))),
        TokenKind::Identifier => {
            let normalized = rules.normalize(raw.text);
            if !is_identifier(&normalized) {
                return Err(FormulaFormatError::new(format!(
                    "variable '{raw}' normalizes to '{normalized}', which is not a valid name"
                )));
            }
            if !rules.is_valid(&normalized) {
                return Err(FormulaFormatError::new(format!(
                    "variable '{normalized}' is not allowed"
                )));
            }
            Ok(Token::Variable(normalized))
        }
        TokenKind::Unrecognized => Err(FormulaFormatError::new(format!(
            "unrecognized token '{raw}'"
        ))),
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

// Numbers come from unsigned literals, so NaN and -0.0 never occur.
impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for token in &self.tokens {
            std::mem::discriminant(token).hash(state);
            match token {
                Token::Number(n) => n.to_bits().hash(state),
                Token::Variable(name) => name.hash(state),
                Token::Op(op) => op.hash(state),
                Token::LParen | Token::RParen => {}
            }
        }
    }
}

impl FromStr for Formula {
    type Err = FormulaFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}
