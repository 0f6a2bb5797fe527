//! `.env` file reader for workspace default variables.

use super::loader::EnvError;
use crate::variables::VariableMap;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Default dot-env file name.
pub const DOTENV_FILE_NAME: &str = ".env";

/// Reads `<workspace>/.env` into a variable map.
///
/// A missing file yields an empty map.
pub fn load_dotenv(workspace_path: &Path) -> Result<VariableMap, EnvError> {
    load_dotenv_file(&workspace_path.join(DOTENV_FILE_NAME))
}

/// Reads a specific dot-env file; a missing file yields an empty map.
pub fn load_dotenv_file(path: &Path) -> Result<VariableMap, EnvError> {
    if !path.is_file() {
        debug!("no dot-env file at {}", path.display());
        return Ok(VariableMap::new());
    }

    let content = fs::read_to_string(path)?;
    Ok(parse_dotenv(&content))
}

/// Parses `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// dropped, and one layer of matching single or double quotes is stripped.
pub fn parse_dotenv(content: &str) -> VariableMap {
    let mut vars = VariableMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            warn!("skipping invalid .env line {}: {}", line_num + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            warn!("skipping .env line {} with empty key", line_num + 1);
            continue;
        }

        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    vars
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
