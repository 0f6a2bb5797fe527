//! Configuration management.
//!
//! Settings are read from a JSON document under the `"rest-chain"` key,
//! merged over defaults, validated, and kept in a process-wide instance that
//! the command-line tool and [`crate::chain::PreRequestChainExecutor::from_config`]
//! read from.

pub mod schema;

pub use schema::EngineConfig;

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

/// Settings key holding the engine configuration.
pub const SETTINGS_KEY: &str = "rest-chain";

/// Global configuration instance, defaults until [`load_config`] runs.
static CONFIG: Lazy<RwLock<EngineConfig>> = Lazy::new(|| RwLock::new(EngineConfig::default()));

/// Loads configuration from a settings JSON value.
///
/// Settings that fail to deserialize are ignored with a warning and the
/// defaults are kept. A configuration that deserializes but fails
/// validation is an error and leaves the global configuration unchanged.
///
/// # Example
///
/// ```
/// use rest_chain::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "rest-chain": {
///         "maxResolveDepth": 5,
///         "failOnUnresolved": true
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.max_resolve_depth, 5);
/// # rest_chain::config::reset_config();
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<EngineConfig, String> {
    let mut config = EngineConfig::default();

    if let Some(settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<EngineConfig>(settings.clone()) {
            Ok(user_config) => config = config.merge(&user_config),
            Err(e) => warn!(
                "failed to parse {} settings: {}, using defaults",
                SETTINGS_KEY, e
            ),
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config.clone();
    debug!("configuration loaded: {:?}", config);

    Ok(config)
}

/// Loads configuration from a JSON settings file.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings file {}: {}", path.display(), e))?;
    let settings: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse settings file {}: {}", path.display(), e))?;
    load_config(Some(settings))
}

/// A clone of the current global configuration.
pub fn get_config() -> EngineConfig {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Updates the global configuration in place.
///
/// If the result fails validation the configuration reverts to defaults.
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut EngineConfig),
{
    let mut config = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    updater(&mut config);

    if let Err(e) = config.validate() {
        warn!("configuration invalid after update: {}, reverting to defaults", e);
        *config = EngineConfig::default();
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = EngineConfig::default();
}
