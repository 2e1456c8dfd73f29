//! Writer for .sheet file format

use crate::document::Contents;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Write cells to a .sheet file
pub fn write_sheet<'a>(
    path: &Path,
    cells: impl IntoIterator<Item = (&'a str, &'a Contents)>,
) -> Result<()> {
    fs::write(path, write_sheet_content(cells))?;
    Ok(())
}

/// Write cells to a .sheet format string, in the order given.
///
/// Empty cells are skipped.
pub fn write_sheet_content<'a>(
    cells: impl IntoIterator<Item = (&'a str, &'a Contents)>,
) -> String {
    let mut lines = vec!["# sheetcalc spreadsheet".to_string()];

    for (name, contents) in cells {
        if contents.is_empty() {
            continue;
        }
        let value = match contents {
            Contents::Number(n) => n.to_string(),
            Contents::Text(s) => format!("\"{}\"", escape_text(s)),
            Contents::Formula(f) => format!("={}", f),
        };
        lines.push(format!("{}: {}", name, value));
    }

    lines.join("\n") + "\n"
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
