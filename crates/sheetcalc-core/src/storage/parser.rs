//! Parser for .sheet file format

use crate::error::{Result, SheetError};
use std::fs;
use std::path::Path;

/// One `NAME: CONTENT` line.
///
/// `content` is the string that, passed to `Spreadsheet::set_contents`,
/// reproduces the saved cell: quotes and escapes are already removed from
/// text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the source
    pub line: usize,
    pub name: String,
    pub content: String,
}

/// Parse a .sheet file
pub fn parse_sheet(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    parse_sheet_content(&content)
}

/// Parse .sheet content from a string
pub fn parse_sheet_content(content: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(SheetError::Parse {
                line: line_num,
                message: "Expected 'NAME: CONTENT' format".to_string(),
            });
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(SheetError::Parse {
                line: line_num,
                message: "Missing cell name".to_string(),
            });
        }

        records.push(Record {
            line: line_num,
            name: name.to_string(),
            content: parse_content(value, line_num)?,
        });
    }

    Ok(records)
}

fn parse_content(value: &str, line_num: usize) -> Result<String> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('=') {
        return Ok(value.to_string());
    }

    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return unescape_text(&value[1..value.len() - 1]).ok_or_else(|| SheetError::Parse {
            line: line_num,
            message: format!("Invalid escape in text: {}", value),
        });
    }

    if value.parse::<f64>().is_ok_and(f64::is_finite) {
        return Ok(value.to_string());
    }

    Err(SheetError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_text(input: &str) -> Option<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(content: &str) -> Record {
        let mut records = parse_sheet_content(content).unwrap();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    #[test]
    fn test_parse_number() {
        let record = single("A1: 42");
        assert_eq!(record.name, "A1");
        assert_eq!(record.content, "42");
        assert_eq!(record.line, 1);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(single(r#"A1: "Hello""#).content, "Hello");
        assert_eq!(single(r#"A1: "  padded ""#).content, "  padded ");
    }

    #[test]
    fn test_parse_text_escapes() {
        let record = single(r#"A1: "He said \"hi\"\nback\\slash""#);
        assert_eq!(record.content, "He said \"hi\"\nback\\slash");
    }

    #[test]
    fn test_bad_escape_is_an_error() {
        let err = parse_sheet_content(r#"A1: "tab\t""#).unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_formula() {
        assert_eq!(single("total: =B1 + C1").content, "=B1 + C1");
    }

    #[test]
    fn test_parse_multiple_cells() {
        let content = r#"
# Test spreadsheet
A1: 100
A2: 200
A3: "Total"
B3: =A1 + A2
"#;
        let records = parse_sheet_content(content).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A1", "A2", "A3", "B3"]);
        assert_eq!(records[3].line, 6);
    }

    #[test]
    fn test_skip_comments_and_empty_lines() {
        let content = r#"
# This is a comment
A1: 42

# Another comment

B1: 100
"#;
        assert_eq!(parse_sheet_content(content).unwrap().len(), 2);
    }

    #[test]
    fn test_unquoted_text_is_rejected() {
        let err = parse_sheet_content("A1: 1\nA2: hello").unwrap_err();
        match err {
            SheetError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("hello"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_sheet_content("A1 42").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 1, .. }));
        let err = parse_sheet_content(": 42").unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 1, .. }));
    }
}
