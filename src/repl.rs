//! Line-oriented front end.
//!
//! Each input line is either a `:` command or an expression evaluated
//! against the current cell values.

use anyhow::Result;
use sheetcalc_core::{Spreadsheet, Value};
use sheetcalc_engine::engine::{ExprError, format_number};
use std::io::{BufRead, Write};
use std::path::Path;

/// Result of evaluating a standalone expression, as printed.
pub fn render_expression(result: &std::result::Result<f64, ExprError>) -> String {
    match result {
        Ok(n) => format_number(*n),
        Err(e) => format!("#ERR {}", e),
    }
}

/// Read commands from `input` until EOF or `exit`/`quit`.
pub fn run<R: BufRead, W: Write>(sheet: &mut Spreadsheet, input: R, mut out: W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        match trimmed {
            "" => continue,
            "exit" | "quit" => break,
            _ => {}
        }

        // commands keep trailing whitespace so `:set` can store padded text
        if let Some(command) = line.trim_start().strip_prefix(':') {
            run_command(sheet, command, &mut out)?;
        } else {
            writeln!(out, "{}", render_expression(&sheet.evaluate(trimmed)))?;
        }
        out.flush()?;
    }
    Ok(())
}

fn run_command<W: Write>(sheet: &mut Spreadsheet, command: &str, out: &mut W) -> Result<()> {
    let (verb, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(v, r)| (v, r.trim_start()));

    match verb {
        "set" => {
            let (name, content) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            match sheet.set_contents(name, content) {
                Ok(changed) => {
                    for name in &changed {
                        writeln!(out, "{} = {}", name, sheet.value(name))?;
                    }
                }
                Err(e) => writeln!(out, "error: {}", e)?,
            }
        }
        "get" => {
            let name = rest.trim();
            write_cell(sheet, name, out)?;
        }
        "list" => {
            let names: Vec<String> = sheet.nonempty_names().map(str::to_string).collect();
            for name in &names {
                write_cell(sheet, name, out)?;
            }
        }
        "save" => {
            let path = rest.trim();
            let saved = if path.is_empty() {
                sheet.save()
            } else {
                sheet.save_as(Path::new(path)).map(|()| Path::new(path).to_path_buf())
            };
            match saved {
                Ok(path) => writeln!(out, "Saved to {}", path.display())?,
                Err(e) => writeln!(out, "error: {}", e)?,
            }
        }
        other => writeln!(out, "error: unknown command :{}", other)?,
    }
    Ok(())
}

fn write_cell<W: Write>(sheet: &Spreadsheet, name: &str, out: &mut W) -> Result<()> {
    let contents = sheet.contents(name).to_input_string();
    let value = sheet.value(name);
    match value {
        Value::Text(s) if s == &contents => writeln!(out, "{}: {}", name, contents)?,
        _ => writeln!(out, "{}: {} => {}", name, contents, value)?,
    }
    Ok(())
}
