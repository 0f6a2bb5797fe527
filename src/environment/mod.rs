//! Environment management.
//!
//! Environments are named variable sets loaded from `.http-client-env.json`
//! (or `http-client.env.json`), plus workspace defaults read from a `.env`
//! file. One environment can be active at a time; its enabled variables sit
//! above the collection scope during resolution.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use rest_chain::environment::{load_environments, EnvironmentSession};
//!
//! let workspace = Path::new("/path/to/workspace");
//! let envs = load_environments(workspace).unwrap();
//!
//! let session = EnvironmentSession::new(envs);
//! session.set_active_environment("dev").ok();
//!
//! if let Some(url) = session.active_variables().get("baseUrl") {
//!     println!("Base URL: {}", url);
//! }
//! ```

pub mod dotenv;
pub mod loader;
pub mod models;

use crate::variables::VariableMap;
use log::debug;
use std::sync::{Arc, PoisonError, RwLock};

pub use dotenv::load_dotenv;
pub use loader::{load_environment_file, load_environments, load_environments_named, EnvError};
pub use models::{Environment, EnvironmentVariable, Environments};

/// Shared handle to the loaded environments and the active selection.
///
/// Clones share state, so switching the active environment through one
/// handle is visible to every resolver holding another.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSession {
    environments: Arc<RwLock<Environments>>,
}

impl EnvironmentSession {
    /// Creates a new environment session with the given environments
    pub fn new(environments: Environments) -> Self {
        Self {
            environments: Arc::new(RwLock::new(environments)),
        }
    }

    /// Sets the active environment by name
    pub fn set_active_environment(&self, name: &str) -> Result<(), EnvError> {
        let mut envs = self
            .environments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if envs.set_active(name) {
            debug!("active environment set to '{}'", name);
            Ok(())
        } else {
            Err(EnvError::UnknownEnvironment(name.to_string()))
        }
    }

    /// Shared variables overlaid with the active environment's enabled ones;
    /// empty when no environment is active.
    pub fn active_variables(&self) -> VariableMap {
        self.environments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_merged_variables()
    }

    /// Lists all available environment names, sorted
    pub fn list_environment_names(&self) -> Vec<String> {
        let mut names = self
            .environments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .list_environments();
        names.sort();
        names
    }

    /// Gets the name of the currently active environment
    pub fn get_active_environment_name(&self) -> Option<String> {
        self.environments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .clone()
    }
}
