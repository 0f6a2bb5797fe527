//! Configuration schema for the resolution engine.

use crate::chain::PrerequisiteFailurePolicy;
use crate::variables::MAX_RECURSION_DEPTH;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Engine configuration, read from the `"rest-chain"` settings key.
///
/// Missing settings fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of substitution passes over a text.
    ///
    /// Bounds nested expansion and guarantees termination on
    /// self-referencing variables. Defaults to 10. Must be greater than 0.
    #[serde(default = "default_max_resolve_depth")]
    pub max_resolve_depth: usize,

    /// Report markers left after resolution as an error instead of sending
    /// them literally. Defaults to false.
    #[serde(default)]
    pub fail_on_unresolved: bool,

    /// What to do when a prerequisite answers with a non-2xx status.
    /// `"abort"` (default) or `"continue"`.
    #[serde(default)]
    pub prerequisite_failure_policy: PrerequisiteFailurePolicy,

    /// Store the target request's response under its name after a send, so
    /// later requests can reference it. Defaults to true.
    #[serde(default = "default_store_target_response")]
    pub store_target_response: bool,

    /// Request timeout in milliseconds for the native transport.
    ///
    /// Defaults to 30000ms (30 seconds). Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether the native transport follows 3xx redirects. Defaults to true.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow. Defaults to 10.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether to validate TLS certificates. Defaults to true.
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    /// Headers added to every request unless the request sets them.
    /// Defaults to a User-Agent header only.
    #[serde(default = "default_headers")]
    pub default_headers: HashMap<String, String>,

    /// Environment file name, searched from the workspace root up to three
    /// parent directories. Defaults to ".http-client-env.json".
    #[serde(default = "default_environment_file")]
    pub environment_file: String,

    /// Dot-env file with workspace default variables, relative to the
    /// workspace root. Defaults to ".env".
    #[serde(default = "default_dotenv_file")]
    pub dotenv_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_resolve_depth: default_max_resolve_depth(),
            fail_on_unresolved: false,
            prerequisite_failure_policy: PrerequisiteFailurePolicy::default(),
            store_target_response: default_store_target_response(),
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            validate_ssl: default_validate_ssl(),
            default_headers: default_headers(),
            environment_file: default_environment_file(),
            dotenv_file: default_dotenv_file(),
        }
    }
}

impl EngineConfig {
    /// Validates the configuration, describing the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_resolve_depth == 0 {
            return Err("maxResolveDepth must be greater than 0".to_string());
        }

        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.environment_file.trim().is_empty() {
            return Err("environmentFile must not be empty".to_string());
        }

        Ok(())
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }

    /// Merges this configuration with another, using values from `other`.
    ///
    /// Default headers are combined, `other` winning on the same name.
    pub fn merge(&self, other: &EngineConfig) -> Self {
        let mut default_headers = self.default_headers.clone();
        default_headers.extend(other.default_headers.clone());

        Self {
            max_resolve_depth: other.max_resolve_depth,
            fail_on_unresolved: other.fail_on_unresolved,
            prerequisite_failure_policy: other.prerequisite_failure_policy,
            store_target_response: other.store_target_response,
            timeout: other.timeout,
            follow_redirects: other.follow_redirects,
            max_redirects: other.max_redirects,
            validate_ssl: other.validate_ssl,
            default_headers,
            environment_file: other.environment_file.clone(),
            dotenv_file: other.dotenv_file.clone(),
        }
    }
}

fn default_max_resolve_depth() -> usize {
    MAX_RECURSION_DEPTH
}

fn default_store_target_response() -> bool {
    true
}

fn default_timeout() -> u64 {
    30000
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_validate_ssl() -> bool {
    true
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "User-Agent".to_string(),
        concat!("rest-chain/", env!("CARGO_PKG_VERSION")).to_string(),
    );
    headers
}

fn default_environment_file() -> String {
    ".http-client-env.json".to_string()
}

fn default_dotenv_file() -> String {
    ".env".to_string()
}
