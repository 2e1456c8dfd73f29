//! Cell data structures.
//!
//! - [`Contents`] - What was entered into a cell (number, text or formula)
//! - [`Value`] - What the cell currently evaluates to
//! - [`Cell`] - Contents plus the last computed value

use std::fmt;

use sheetcalc_engine::engine::{EvalError, Formula, format_number};

/// The contents entered into a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Contents {
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl Contents {
    /// Contents of a cell that was never set.
    pub(crate) const EMPTY: Contents = Contents::Text(String::new());

    pub fn is_empty(&self) -> bool {
        matches!(self, Contents::Text(s) if s.is_empty())
    }

    /// The string that, set back into a cell, reproduces these contents.
    pub fn to_input_string(&self) -> String {
        match self {
            Contents::Number(n) => n.to_string(),
            Contents::Text(s) => s.clone(),
            Contents::Formula(f) => format!("={}", f),
        }
    }
}

impl Default for Contents {
    fn default() -> Self {
        Contents::EMPTY
    }
}

/// The evaluated value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl Value {
    pub(crate) const EMPTY: Value = Value::Text(String::new());

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::EMPTY
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error(e) => write!(f, "#ERR {}", e.reason()),
        }
    }
}

/// A materialized cell in the spreadsheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub contents: Contents,
    pub value: Value,
}

impl Cell {
    /// Value of `contents` when no evaluation is needed.
    pub(crate) fn literal_value(contents: &Contents) -> Option<Value> {
        match contents {
            Contents::Number(n) => Some(Value::Number(*n)),
            Contents::Text(s) => Some(Value::Text(s.clone())),
            Contents::Formula(_) => None,
        }
    }
}
