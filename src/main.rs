//! Sheetcalc - formula spreadsheet on the command line

mod config;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use config::{NameCase, Settings};
use sheetcalc_core::Spreadsheet;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sheetcalc", version)]
#[command(about = "Formula spreadsheet with incremental recalculation")]
struct Cli {
    /// Spreadsheet file to open (.sheet)
    file: Option<PathBuf>,

    /// Evaluate an expression against the sheet and exit
    #[arg(short = 'c', long = "command", value_name = "EXPR")]
    command: Option<String>,

    /// Read settings from this file instead of the user config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// Case normalization for cell names
    #[arg(long, value_enum)]
    case: Option<NameCase>,

    /// Regex every normalized cell name must match
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let file = if cli.no_config {
        config::ConfigFile::default()
    } else {
        let (file, warnings) = config::load_config(cli.config.as_deref());
        for warning in warnings {
            eprintln!("Warning: {}", warning);
        }
        file
    };
    let settings = Settings::resolve(&file, cli.case, cli.pattern.as_deref())?;

    let mut sheet = match &cli.file {
        Some(path) if path.exists() => Spreadsheet::open(path, settings.name_rules())
            .with_context(|| format!("failed to open {}", path.display()))?,
        Some(path) => {
            let mut sheet = Spreadsheet::with_rules(settings.name_rules());
            sheet.set_file_path(path);
            sheet
        }
        None => Spreadsheet::with_rules(settings.name_rules()),
    };
    sheet.set_recalc_limit(settings.recalc_limit);

    if let Some(expr) = cli.command {
        let result = sheet.evaluate(&expr);
        println!("{}", repl::render_expression(&result));
        return Ok(if result.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    repl::run(&mut sheet, io::stdin().lock(), io::stdout().lock())?;
    if sheet.is_modified() {
        log::warn!("exiting with unsaved changes");
    }
    Ok(ExitCode::SUCCESS)
}
