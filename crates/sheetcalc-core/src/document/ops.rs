use super::Spreadsheet;
use super::cell::{Cell, Contents, Value};
use crate::error::{Result, SheetError};
use log::{debug, trace, warn};
use sheetcalc_engine::engine::{
    EvalError, ExprError, Formula, OrderError, evaluate_expression, evaluation_order,
    recalculation_order,
};
use std::collections::BTreeSet;

/// Parse a number the way cell input is read: surrounding whitespace and a
/// sign are allowed, `inf`/`nan` spellings are not.
fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl Spreadsheet {
    /// Set the contents of `name` from user input and recalculate.
    ///
    /// - Input that reads as a number -> Number
    /// - Input starting with '=' -> Formula (the rest must be a valid formula)
    /// - Anything else -> Text (empty input leaves an empty cell)
    ///
    /// Returns every recomputed cell in evaluation order, starting with
    /// `name` itself. On error nothing changes.
    pub fn set_contents(&mut self, name: &str, input: &str) -> Result<Vec<String>> {
        let name = self
            .rules
            .accept(name)
            .ok_or_else(|| SheetError::InvalidName(name.to_string()))?;
        let contents = self.parse_contents(input)?;

        let referenced: BTreeSet<String> = match &contents {
            Contents::Formula(f) => f.variables().into_iter().map(str::to_string).collect(),
            Contents::Number(_) | Contents::Text(_) => BTreeSet::new(),
        };
        let order = self.pending_order(&name, &referenced)?;

        self.graph.replace_dependents(&name, &referenced);
        self.cells.entry(name.clone()).or_default().contents = contents;
        self.recompute(&order);
        self.modified = true;

        debug!("set {}: recalculated {:?}", name, order);
        Ok(order)
    }

    pub(crate) fn parse_contents(&self, input: &str) -> Result<Contents> {
        if let Some(n) = parse_number(input) {
            return Ok(Contents::Number(n));
        }
        if let Some(source) = input.strip_prefix('=') {
            return Ok(Contents::Formula(Formula::parse_with(source, &self.rules)?));
        }
        Ok(Contents::Text(input.to_string()))
    }

    /// Recalculation order for `name` as if its formula referenced exactly
    /// `referenced`, computed without touching the graph.
    fn pending_order(&self, name: &str, referenced: &BTreeSet<String>) -> Result<Vec<String>> {
        let readers = |cell: &str| -> Vec<String> {
            let mut readers: Vec<String> = self
                .graph
                .dependees(cell)
                .filter(|reader| *reader != name)
                .map(str::to_string)
                .collect();
            if referenced.contains(cell) {
                readers.push(name.to_string());
            }
            readers
        };

        recalculation_order(name, readers, self.recalc_limit).map_err(|e| match e {
            OrderError::Cycle(path) => {
                warn!("rejected edit to {}: {}", name, path.join(" -> "));
                SheetError::CircularDependency { path }
            }
            OrderError::TooLarge { limit } => {
                warn!("rejected edit to {}: more than {} cells to recalculate", name, limit);
                SheetError::RecalcLimit { limit }
            }
        })
    }

    /// Recompute the value of each cell in `order`, in that order.
    fn recompute(&mut self, order: &[String]) {
        for name in order {
            let Some(value) = self.compute_value(name) else {
                continue;
            };
            trace!("{} = {:?}", name, value);
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    fn compute_value(&self, name: &str) -> Option<Value> {
        let cell = self.cells.get(name)?;
        if let Some(value) = Cell::literal_value(&cell.contents) {
            return Some(value);
        }
        let Contents::Formula(formula) = &cell.contents else {
            return None;
        };
        Some(match formula.evaluate(|var| self.lookup(var)) {
            Ok(n) => Value::Number(n),
            Err(e) => Value::Error(e),
        })
    }

    /// Numeric value of a referenced cell.
    ///
    /// Empty and unset cells read as 0. Text and error values do not read as
    /// numbers; the referencing formula gets an error instead.
    fn lookup(&self, name: &str) -> std::result::Result<f64, EvalError> {
        match self.cells.get(name).map(|cell| &cell.value) {
            None => Ok(0.0),
            Some(Value::Number(n)) => Ok(*n),
            Some(Value::Text(s)) if s.is_empty() => Ok(0.0),
            Some(Value::Text(_)) => Err(EvalError::NonNumeric(name.to_string())),
            Some(Value::Error(_)) => Err(EvalError::ErrorReference(name.to_string())),
        }
    }

    /// Re-evaluate every cell, each one after the cells it reads.
    pub fn recalculate_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.cells.keys().cloned().collect();
        let order = evaluation_order(names, |name| {
            self.graph.dependents(name).map(str::to_string).collect()
        })
        .map_err(|e| match e {
            OrderError::Cycle(path) => SheetError::CircularDependency { path },
            OrderError::TooLarge { limit } => SheetError::RecalcLimit { limit },
        })?;
        self.recompute(&order);
        debug!("recalculated {} cells", order.len());
        Ok(())
    }

    /// Evaluate a self-contained expression against the current cell values.
    ///
    /// A leading '=' is optional.
    pub fn evaluate(&self, expression: &str) -> std::result::Result<f64, ExprError> {
        let source = expression.trim_start();
        let source = source.strip_prefix('=').unwrap_or(source);
        evaluate_expression(source, &self.rules, |var| self.lookup(var))
    }
}
