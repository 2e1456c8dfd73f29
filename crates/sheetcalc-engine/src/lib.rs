//! sheetcalc_engine - Formula parsing, evaluation and dependency tracking.

pub mod engine;
