//! Error types for Sheetcalc core.

use thiserror::Error;

use sheetcalc_engine::engine::FormulaFormatError;

/// Errors that can occur while editing, loading or saving a spreadsheet
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid cell name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    FormulaFormat(#[from] FormulaFormatError),

    #[error("Circular dependency detected: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("Recalculation would touch more than {limit} cells")]
    RecalcLimit { limit: usize },

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SheetError>;
