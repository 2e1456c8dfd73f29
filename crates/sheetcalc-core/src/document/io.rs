use super::{Contents, Spreadsheet};
use crate::error::{Result, SheetError};
use crate::storage::{Record, parse_sheet, write_sheet};
use log::debug;
use sheetcalc_engine::engine::NameRules;
use std::path::{Path, PathBuf};

impl Spreadsheet {
    /// `(name, content)` for every non-empty cell in name order, where
    /// `content` is the input string that reproduces the cell.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.contents.is_empty())
            .map(|(name, cell)| (name.clone(), cell.contents.to_input_string()))
            .collect()
    }

    /// Build a spreadsheet by setting each entry in turn.
    pub fn from_entries<I, N, C>(rules: NameRules, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut sheet = Spreadsheet::with_rules(rules);
        for (name, content) in entries {
            sheet.set_contents(name.as_ref(), content.as_ref())?;
        }
        sheet.modified = false;
        Ok(sheet)
    }

    /// Open a .sheet file.
    pub fn open(path: &Path, rules: NameRules) -> Result<Self> {
        let mut sheet = Spreadsheet::with_rules(rules);
        sheet.load_file(path)?;
        Ok(sheet)
    }

    /// Replace the contents of this sheet with a .sheet file.
    ///
    /// On error the sheet is left as it was.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let records = parse_sheet(path)?;

        let mut loaded = Spreadsheet::with_rules(std::mem::take(&mut self.rules));
        loaded.recalc_limit = self.recalc_limit;
        let result = loaded.load_records(&records);
        if let Err(e) = result {
            self.rules = std::mem::take(&mut loaded.rules);
            return Err(e);
        }

        loaded.file_path = Some(path.to_path_buf());
        loaded.modified = false;
        *self = loaded;

        debug!("loaded {} cells from {}", self.cells.len(), path.display());
        Ok(())
    }

    /// Insert every record, then evaluate the whole sheet once.
    fn load_records(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            let at_line = |e: SheetError| SheetError::Parse {
                line: record.line,
                message: e.to_string(),
            };
            let name = self
                .rules
                .accept(&record.name)
                .ok_or_else(|| at_line(SheetError::InvalidName(record.name.clone())))?;
            let contents = self.parse_contents(&record.content).map_err(at_line)?;

            let referenced: Vec<String> = match &contents {
                Contents::Formula(f) => f.variables().into_iter().map(str::to_string).collect(),
                Contents::Number(_) | Contents::Text(_) => Vec::new(),
            };
            self.graph.replace_dependents(&name, &referenced);
            self.cells.entry(name).or_default().contents = contents;
        }
        self.recalculate_all()
    }

    /// Save to the current file path.
    /// Returns the path saved to.
    pub fn save(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SheetError::NoFilePath);
        };
        self.write_to(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the current file path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.write_to(path)?;
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        let cells = self
            .cells
            .iter()
            .map(|(name, cell)| (name.as_str(), &cell.contents));
        write_sheet(path, cells)?;
        self.modified = false;
        debug!("saved {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{Contents, Spreadsheet, Value};
    use crate::error::SheetError;
    use sheetcalc_engine::engine::{EvalError, NameRules};
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("sheetcalc_{}_{}.sheet", name, std::process::id()));
        p
    }

    #[test]
    fn test_entries_and_from_entries() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents("B1", "=A1 * 2").unwrap();
        sheet.set_contents("A1", "4").unwrap();
        sheet.set_contents("C1", "note").unwrap();
        sheet.set_contents("D1", "").unwrap();

        let entries = sheet.entries();
        assert_eq!(
            entries,
            vec![
                ("A1".to_string(), "4".to_string()),
                ("B1".to_string(), "=A1*2".to_string()),
                ("C1".to_string(), "note".to_string()),
            ]
        );

        let copy = Spreadsheet::from_entries(NameRules::default(), entries).unwrap();
        assert_eq!(copy.value("B1"), &Value::Number(8.0));
        assert_eq!(copy.entries(), sheet.entries());
        assert!(!copy.is_modified());
    }

    #[test]
    fn test_from_entries_rejects_cycles() {
        let err = Spreadsheet::from_entries(NameRules::default(), [("a", "=b"), ("b", "=a")])
            .unwrap_err();
        assert!(matches!(err, SheetError::CircularDependency { .. }));
    }

    #[test]
    fn test_save_requires_path() {
        let mut sheet = Spreadsheet::new();
        assert!(matches!(sheet.save(), Err(SheetError::NoFilePath)));
    }

    #[test]
    fn test_save_and_open() {
        let path = temp_path("save_open");
        let mut sheet = Spreadsheet::new();
        sheet.set_contents("price", "2.5").unwrap();
        sheet.set_contents("qty", "4").unwrap();
        sheet.set_contents("total", "= price * qty").unwrap();
        sheet.set_contents("label", "Total: \"all\"").unwrap();
        sheet.save_as(&path).unwrap();
        assert!(!sheet.is_modified());
        assert_eq!(sheet.file_path(), Some(path.as_path()));

        let opened = Spreadsheet::open(&path, NameRules::default()).unwrap();
        assert_eq!(opened.value("total"), &Value::Number(10.0));
        assert_eq!(opened.contents("label"), &Contents::Text("Total: \"all\"".into()));
        assert_eq!(opened.entries(), sheet.entries());
        assert_eq!(opened.graph(), sheet.graph());
        assert!(!opened.is_modified());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_out_of_order_formulas() {
        let path = temp_path("out_of_order");
        fs::write(&path, "C1: =B1 + 1\nB1: =A1 * 2\nA1: 5\nD1: \"x\"\nE1: =D1\n").unwrap();

        let sheet = Spreadsheet::open(&path, NameRules::default()).unwrap();
        assert_eq!(sheet.value("B1"), &Value::Number(10.0));
        assert_eq!(sheet.value("C1"), &Value::Number(11.0));
        assert_eq!(
            sheet.value("E1"),
            &Value::Error(EvalError::NonNumeric("D1".into()))
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_failed_load_leaves_sheet_untouched() {
        let path = temp_path("bad_load");
        let mut sheet = Spreadsheet::with_rules(NameRules::new(|s| s.to_uppercase(), |_| true));
        sheet.set_contents("a1", "1").unwrap();

        fs::write(&path, "A1: 1\nB1: =A1 +\n").unwrap();
        let err = sheet.load_file(&path).unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 2, .. }));

        fs::write(&path, "A1: =B1\nB1: =A1\n").unwrap();
        let err = sheet.load_file(&path).unwrap_err();
        assert!(matches!(err, SheetError::CircularDependency { .. }));

        let err = sheet.load_file(&temp_path("does_not_exist")).unwrap_err();
        assert!(matches!(err, SheetError::Io(_)));

        assert_eq!(sheet.value("A1"), &Value::Number(1.0));
        assert!(sheet.file_path().is_none());
        assert!(sheet.is_modified());
        // rules survive the failed loads
        sheet.set_contents("b1", "=a1").unwrap();
        assert_eq!(sheet.value("B1"), &Value::Number(1.0));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_names() {
        let path = temp_path("bad_name");
        fs::write(&path, "# comment\n1abc: 5\n").unwrap();
        let err = Spreadsheet::open(&path, NameRules::default()).unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 2, .. }));
        let _ = fs::remove_file(&path);
    }
}
