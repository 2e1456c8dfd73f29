//! User configuration: `config.toml` plus command line overrides.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use regex::Regex;
use serde::Deserialize;
use sheetcalc_core::NameRules;
use sheetcalc_core::document::DEFAULT_RECALC_LIMIT;
use std::path::{Path, PathBuf};

/// How cell names are normalized before use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    #[default]
    Preserve,
    Upper,
    Lower,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    names: Option<NamesSection>,
    engine: Option<EngineSection>,
}

#[derive(Debug, Deserialize)]
struct NamesSection {
    case: Option<NameCase>,
    pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EngineSection {
    recalc_limit: Option<usize>,
}

/// Settings after merging the config file with command line flags.
#[derive(Debug)]
pub struct Settings {
    pub case: NameCase,
    pub pattern: Option<Regex>,
    pub recalc_limit: usize,
}

/// Read `config.toml` from `explicit` or the user config directory.
///
/// Problems are returned as warnings and fall back to defaults.
pub fn load_config(explicit: Option<&Path>) -> (ConfigFile, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (ConfigFile::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (ConfigFile::default(), warnings);
    }

    let file = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(parsed) => parsed,
            Err(err) => {
                warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                ConfigFile::default()
            }
        },
        Err(err) => {
            warnings.push(format!("Failed to read {}: {}", path.display(), err));
            ConfigFile::default()
        }
    };
    log::debug!("config from {}: {:?}", path.display(), file);
    (file, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

impl Settings {
    /// Flags win over the file; the file wins over defaults.
    pub fn resolve(file: &ConfigFile, case: Option<NameCase>, pattern: Option<&str>) -> Result<Self> {
        let names = file.names.as_ref();
        let case = case
            .or_else(|| names.and_then(|n| n.case))
            .unwrap_or_default();
        let pattern = match pattern.or_else(|| names.and_then(|n| n.pattern.as_deref())) {
            Some(p) => Some(Regex::new(p).with_context(|| format!("invalid name pattern {:?}", p))?),
            None => None,
        };
        let recalc_limit = file
            .engine
            .as_ref()
            .and_then(|e| e.recalc_limit)
            .unwrap_or(DEFAULT_RECALC_LIMIT);

        Ok(Settings {
            case,
            pattern,
            recalc_limit,
        })
    }

    pub fn name_rules(&self) -> NameRules {
        let case = self.case;
        let pattern = self.pattern.clone();
        NameRules::new(
            move |name| match case {
                NameCase::Preserve => name.to_string(),
                NameCase::Upper => name.to_uppercase(),
                NameCase::Lower => name.to_lowercase(),
            },
            move |name| pattern.as_ref().is_none_or(|re| re.is_match(name)),
        )
    }
}
