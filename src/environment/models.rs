//! Environment data models.
//!
//! An environment is a named set of variables (dev, staging, production).
//! Each variable can be switched off without deleting it; disabled entries
//! never take part in resolution.

use crate::variables::VariableMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single environment variable with its enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVariable")]
pub struct EnvironmentVariable {
    /// Raw value, possibly containing placeholders.
    pub value: String,
    /// Whether the variable participates in resolution.
    pub enabled: bool,
}

impl EnvironmentVariable {
    /// Creates an enabled variable.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a disabled variable.
    pub fn disabled(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            enabled: false,
        }
    }
}

/// Accepted serialized shapes: `"value"` or `{"value": "...", "enabled": false}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVariable {
    Plain(String),
    Detailed {
        value: String,
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
}

fn default_enabled() -> bool {
    true
}

impl From<RawVariable> for EnvironmentVariable {
    fn from(raw: RawVariable) -> Self {
        match raw {
            RawVariable::Plain(value) => Self::new(value),
            RawVariable::Detailed { value, enabled } => Self { value, enabled },
        }
    }
}

/// Represents a single environment with its variables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    /// Environment name (e.g., "dev", "staging", "production")
    pub name: String,

    /// Variables of this environment, enabled or not
    #[serde(default)]
    pub variables: HashMap<String, EnvironmentVariable>,
}

impl Environment {
    /// Creates a new environment with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: HashMap::new(),
        }
    }

    /// Gets an enabled variable's value by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .get(key)
            .filter(|var| var.enabled)
            .map(|var| var.value.as_str())
    }

    /// Sets an enabled variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables
            .insert(key.into(), EnvironmentVariable::new(value));
    }

    /// Inserts a variable with an explicit enabled flag
    pub fn insert(&mut self, key: impl Into<String>, variable: EnvironmentVariable) {
        self.variables.insert(key.into(), variable);
    }

    /// All enabled variables as a flat map
    pub fn enabled_variables(&self) -> VariableMap {
        self.variables
            .iter()
            .filter(|(_, var)| var.enabled)
            .map(|(key, var)| (key.clone(), var.value.clone()))
            .collect()
    }

    /// Returns the number of variables, enabled or not
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Checks if the environment has no variables
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Container for all environments and shared variables
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Environments {
    /// Named environments (e.g., "dev", "staging", "production")
    #[serde(default)]
    pub environments: HashMap<String, Environment>,

    /// Shared variables available in all environments
    #[serde(default)]
    pub shared: VariableMap,

    /// Currently active environment name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl Environments {
    /// Creates a new empty Environments collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an environment to the collection
    pub fn add_environment(&mut self, env: Environment) {
        self.environments.insert(env.name.clone(), env);
    }

    /// Gets an environment by name
    pub fn get_environment(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name)
    }

    /// Sets the active environment; `false` if no such environment exists
    pub fn set_active(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.environments.contains_key(&name) {
            self.active = Some(name);
            true
        } else {
            false
        }
    }

    /// Gets the currently active environment
    pub fn get_active(&self) -> Option<&Environment> {
        self.active
            .as_ref()
            .and_then(|name| self.environments.get(name))
    }

    /// Sets a shared variable
    pub fn set_shared(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.shared.insert(key.into(), value.into());
    }

    /// Shared variables overlaid with the active environment's enabled variables.
    ///
    /// Empty when no environment is active: shared values belong to the
    /// environment tier and never sit above collection variables on their own.
    pub fn get_merged_variables(&self) -> VariableMap {
        let Some(env) = self.get_active() else {
            return VariableMap::new();
        };

        let mut merged = self.shared.clone();
        merged.extend(env.enabled_variables());
        merged
    }

    /// Lists all environment names
    pub fn list_environments(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Checks if an environment exists
    pub fn has_environment(&self, name: &str) -> bool {
        self.environments.contains_key(name)
    }

    /// Returns the number of environments
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    /// Checks if there are no environments
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}
