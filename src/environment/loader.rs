//! Environment file loader.
//!
//! Searches for `.http-client-env.json` (or `http-client.env.json`) starting
//! at the workspace root and walking up to three parent directories.
//!
//! ```json
//! {
//!   "$shared": { "apiVersion": "v1" },
//!   "dev": {
//!     "baseUrl": "http://localhost:3000",
//!     "legacyToken": { "value": "old", "enabled": false }
//!   },
//!   "$active": "dev"
//! }
//! ```

use super::models::{Environment, EnvironmentVariable, Environments};
use crate::variables::VariableMap;
use log::{debug, warn};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during environment loading
#[derive(Debug, Clone, PartialEq)]
pub enum EnvError {
    /// Failed to parse JSON content
    ParseError(String),

    /// Invalid format or structure in the environment file
    InvalidFormat(String),

    /// Named environment does not exist
    UnknownEnvironment(String),

    /// IO error occurred while reading file
    IoError(String),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::ParseError(msg) => write!(f, "Failed to parse environment file: {}", msg),
            EnvError::InvalidFormat(msg) => write!(f, "Invalid environment format: {}", msg),
            EnvError::UnknownEnvironment(name) => write!(f, "Environment '{}' not found", name),
            EnvError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for EnvError {}

impl From<io::Error> for EnvError {
    fn from(err: io::Error) -> Self {
        EnvError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EnvError {
    fn from(err: serde_json::Error) -> Self {
        EnvError::ParseError(err.to_string())
    }
}

/// Supported environment file names in order of preference
pub const ENV_FILE_NAMES: &[&str] = &[".http-client-env.json", "http-client.env.json"];

/// Maximum number of parent directories to search
const MAX_PARENT_SEARCH_DEPTH: usize = 3;

/// Loads environment configuration from the workspace.
///
/// A missing file is not an error: an empty [`Environments`] is returned.
/// A file that exists but cannot be parsed is.
pub fn load_environments(workspace_path: &Path) -> Result<Environments, EnvError> {
    load_environments_named(workspace_path, ENV_FILE_NAMES)
}

/// Like [`load_environments`], trying `file_names` in order in each directory.
pub fn load_environments_named(
    workspace_path: &Path,
    file_names: &[&str],
) -> Result<Environments, EnvError> {
    let Some(env_file) = find_environment_file(workspace_path, file_names) else {
        debug!(
            "no environment file found from {}, using empty environments",
            workspace_path.display()
        );
        return Ok(Environments::new());
    };

    load_environment_file(&env_file)
}

/// Loads a specific environment file.
pub fn load_environment_file(path: &Path) -> Result<Environments, EnvError> {
    debug!("loading environments from {}", path.display());
    let content = fs::read_to_string(path)?;
    let raw: JsonValue = serde_json::from_str(&content)?;
    parse_environment_file(raw)
}

/// Finds the environment file by searching workspace and parent directories
pub fn find_environment_file(workspace_path: &Path, file_names: &[&str]) -> Option<PathBuf> {
    let mut current = Some(workspace_path);

    for _ in 0..=MAX_PARENT_SEARCH_DEPTH {
        let dir = current?;
        if let Some(found) = file_names
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }
        current = dir.parent();
    }

    None
}

/// Parses the raw JSON into validated Environments structure
fn parse_environment_file(raw: JsonValue) -> Result<Environments, EnvError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| EnvError::InvalidFormat("Root must be a JSON object".to_string()))?;

    let mut environments = HashMap::new();
    let mut shared = VariableMap::new();
    let mut active = None;

    for (key, value) in obj {
        match key.as_str() {
            "shared" | "$shared" => {
                shared = parse_variable_map(value, "shared")?
                    .into_iter()
                    .filter(|(_, var)| var.enabled)
                    .map(|(name, var)| (name, var.value))
                    .collect();
            }
            "active" | "$active" => match value.as_str() {
                Some(name) => active = Some(name.to_string()),
                None => warn!("ignoring non-string active environment value"),
            },
            env_name => {
                if !is_valid_identifier(env_name) {
                    return Err(EnvError::InvalidFormat(format!(
                        "Invalid environment name: '{}'. Names must be alphanumeric with underscores/hyphens",
                        env_name
                    )));
                }

                let variables = parse_variable_map(value, env_name)?;
                environments.insert(
                    env_name.to_string(),
                    Environment {
                        name: env_name.to_string(),
                        variables,
                    },
                );
            }
        }
    }

    if let Some(ref active_name) = active {
        if !environments.contains_key(active_name) {
            return Err(EnvError::InvalidFormat(format!(
                "Active environment '{}' does not exist",
                active_name
            )));
        }
    }

    Ok(Environments {
        environments,
        shared,
        active,
    })
}

/// Parses a JSON object of variables.
///
/// Values may be scalars or `{ "value": ..., "enabled": bool }` objects.
fn parse_variable_map(
    value: &JsonValue,
    context: &str,
) -> Result<HashMap<String, EnvironmentVariable>, EnvError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EnvError::InvalidFormat(format!("'{}' must be a JSON object", context)))?;

    let mut map = HashMap::new();

    for (key, val) in obj {
        let variable = match val {
            JsonValue::Object(entry) => {
                let value = entry
                    .get("value")
                    .and_then(scalar_to_string)
                    .ok_or_else(|| invalid_variable(key, context))?;
                let enabled = match entry.get("enabled") {
                    None => true,
                    Some(JsonValue::Bool(enabled)) => *enabled,
                    Some(_) => {
                        return Err(EnvError::InvalidFormat(format!(
                            "Variable '{}' in '{}' has a non-boolean 'enabled' flag",
                            key, context
                        )))
                    }
                };
                EnvironmentVariable { value, enabled }
            }
            scalar => EnvironmentVariable::new(
                scalar_to_string(scalar).ok_or_else(|| invalid_variable(key, context))?,
            ),
        };

        map.insert(key.clone(), variable);
    }

    Ok(map)
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => Some(String::new()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn invalid_variable(key: &str, context: &str) -> EnvError {
    EnvError::InvalidFormat(format!(
        "Variable '{}' in '{}' has invalid type (must be string, number, boolean, or {{\"value\", \"enabled\"}})",
        key, context
    ))
}

/// Environment names start with a letter or underscore, continue with
/// letters, digits, underscores or hyphens, and are not reserved keys.
fn is_valid_identifier(name: &str) -> bool {
    if name == "shared" || name == "active" || name.starts_with('$') {
        return false;
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
