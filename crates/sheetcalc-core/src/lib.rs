//! sheetcalc-core - UI-agnostic spreadsheet document + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{Cell, Contents, Spreadsheet, Value};
pub use error::{Result, SheetError};

pub use sheetcalc_engine::engine::{EvalError, Formula, NameRules};
