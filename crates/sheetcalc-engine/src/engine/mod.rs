//! Formula engine API.
//!
//! - [`tokenize`] - Lazy formula tokenizer
//! - [`Formula`] - Validated, immutable infix formula and its evaluator
//! - [`DependencyGraph`] - Two-way indexed "depends on" pairs
//! - [`recalculation_order`], [`evaluation_order`] - Topological orders with cycle detection
//! - [`NameRules`] - Identifier normalization and validation
//! - [`format_number`] - Format values for display

mod cycle;
mod deps;
mod eval;
mod format;
mod formula;
mod name;
mod token;

pub use cycle::{OrderError, evaluation_order, recalculation_order};
pub use deps::DependencyGraph;
pub use eval::{EvalError, ExprError, evaluate_expression};
pub use format::format_number;
pub use formula::{Formula, FormulaFormatError, Operator, Token};
pub use name::{NameRules, is_identifier};
pub use token::{RawToken, TokenKind, Tokens, tokenize};
