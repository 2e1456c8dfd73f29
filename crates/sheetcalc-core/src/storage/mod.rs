//! `.sheet` file format.
//!
//! One cell per line as `NAME: CONTENT`. Blank lines and `#` comments are
//! skipped. Numbers are written plainly, formulas as `=` plus the formula,
//! text as a double-quoted string.

mod parser;
mod writer;

pub use parser::{Record, parse_sheet, parse_sheet_content};
pub use writer::{write_sheet, write_sheet_content};
