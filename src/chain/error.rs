//! Chain execution error types.

use crate::auth::AuthError;
use crate::executor::RequestError;
use crate::variables::ResolveError;
use std::fmt;

/// Errors that end a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Prerequisite ids form a loop. The path starts at the request being
    /// sent and ends with the id that closed the loop.
    CyclicDependency(Vec<String>),

    /// A prerequisite could not be exchanged with the server.
    PrerequisiteExecution { request: String, message: String },

    /// A prerequisite answered non-2xx and the failure handler aborted.
    PrerequisiteFailed { request: String, status: u16 },

    /// A declared prerequisite id does not exist.
    PrerequisiteNotFound { request: String, prerequisite: String },

    /// Strict resolution left markers in a request.
    Resolve { request: String, source: ResolveError },

    /// Resolved credentials could not be projected.
    Auth { request: String, source: AuthError },

    /// The target request could not be exchanged with the server.
    Transport { request: String, source: RequestError },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::CyclicDependency(path) => {
                write!(f, "Cyclic prerequisite dependency: {}", path.join(" -> "))
            }
            ChainError::PrerequisiteExecution { request, message } => {
                write!(f, "Prerequisite '{}' failed to execute: {}", request, message)
            }
            ChainError::PrerequisiteFailed { request, status } => {
                write!(f, "Prerequisite '{}' returned status {}", request, status)
            }
            ChainError::PrerequisiteNotFound {
                request,
                prerequisite,
            } => write!(
                f,
                "Prerequisite '{}' of request '{}' not found",
                prerequisite, request
            ),
            ChainError::Resolve { request, source } => {
                write!(f, "Failed to resolve request '{}': {}", request, source)
            }
            ChainError::Auth { request, source } => {
                write!(f, "Failed to authenticate request '{}': {}", request, source)
            }
            ChainError::Transport { request, source } => {
                write!(f, "Request '{}' failed: {}", request, source)
            }
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainError::Resolve { source, .. } => Some(source),
            ChainError::Auth { source, .. } => Some(source),
            ChainError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}
