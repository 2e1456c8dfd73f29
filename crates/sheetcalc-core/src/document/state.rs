use sheetcalc_engine::engine::{DependencyGraph, NameRules};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::cell::{Cell, Contents, Value};

/// Default cap on the number of cells one edit may recalculate.
pub const DEFAULT_RECALC_LIMIT: usize = 100_000;

static EMPTY_CONTENTS: Contents = Contents::EMPTY;
static EMPTY_VALUE: Value = Value::EMPTY;

/// UI-agnostic spreadsheet document.
///
/// Owns the cell table and the dependency graph. After every successful edit
/// the graph holds exactly one pair `(cell, variable)` for each variable
/// referenced by each formula cell, and contains no cycles.
pub struct Spreadsheet {
    /// Materialized cells by normalized name
    pub(crate) cells: BTreeMap<String, Cell>,
    /// (formula cell, referenced variable) pairs
    pub(crate) graph: DependencyGraph,
    /// Normalizer and validity predicate for cell and variable names
    pub(crate) rules: NameRules,
    /// Maximum number of cells a single edit may recalculate
    pub(crate) recalc_limit: usize,
    /// Current file path
    pub(crate) file_path: Option<PathBuf>,
    /// Whether the sheet has changed since it was last loaded or saved
    pub(crate) modified: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet with identity normalization and no extra
    /// name restrictions.
    pub fn new() -> Self {
        Self::with_rules(NameRules::default())
    }

    /// Create an empty spreadsheet using `rules` for every cell and variable
    /// name.
    pub fn with_rules(rules: NameRules) -> Self {
        Spreadsheet {
            cells: BTreeMap::new(),
            graph: DependencyGraph::new(),
            rules,
            recalc_limit: DEFAULT_RECALC_LIMIT,
            file_path: None,
            modified: false,
        }
    }

    pub fn rules(&self) -> &NameRules {
        &self.rules
    }

    pub fn recalc_limit(&self) -> usize {
        self.recalc_limit
    }

    pub fn set_recalc_limit(&mut self, limit: usize) {
        self.recalc_limit = limit;
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Set the path used by `save` without writing anything.
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Dependency pairs implied by the current formulas.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Contents of `name`; cells that were never set are empty text.
    ///
    /// `name` is normalized first. Names the rules reject have no contents.
    pub fn contents(&self, name: &str) -> &Contents {
        self.cell(name)
            .map_or(&EMPTY_CONTENTS, |cell| &cell.contents)
    }

    /// Value of `name`; cells that were never set are empty text.
    pub fn value(&self, name: &str) -> &Value {
        self.cell(name).map_or(&EMPTY_VALUE, |cell| &cell.value)
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        let name = self.rules.accept(name)?;
        self.cells.get(&name)
    }

    /// Names of every cell with non-empty contents, in sorted order.
    pub fn nonempty_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.contents.is_empty())
            .map(|(name, _)| name.as_str())
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("graph", &self.graph)
            .field("file_path", &self.file_path)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}
