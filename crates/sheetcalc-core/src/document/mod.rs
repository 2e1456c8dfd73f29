//! Spreadsheet state and logic (UI-agnostic).

mod cell;
mod io;
mod ops;
mod state;

pub use cell::{Cell, Contents, Value};
pub use state::{DEFAULT_RECALC_LIMIT, Spreadsheet};
