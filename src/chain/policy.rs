//! What to do when a prerequisite answers with a non-2xx status.

use crate::models::request::RequestDefinition;
use crate::models::response::HttpResponse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of evaluating a prerequisite response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureDecision {
    /// Stop the whole send.
    Abort,
    /// Keep going with the next step.
    Continue,
}

/// Decides whether a failed prerequisite aborts the send.
///
/// Interactive hosts implement this to ask the user; the async signature
/// lets them wait for an answer. [`PrerequisiteFailurePolicy`] is the
/// non-interactive implementation.
#[async_trait]
pub trait FailureHandler: Send + Sync {
    /// Called once per prerequisite whose response is not 2xx.
    async fn on_prerequisite_failure(
        &self,
        prerequisite: &RequestDefinition,
        response: &HttpResponse,
    ) -> FailureDecision;
}

/// Fixed answer for every failed prerequisite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrerequisiteFailurePolicy {
    /// Abort the send with [`super::ChainError::PrerequisiteFailed`].
    #[default]
    Abort,
    /// Ignore the status and continue.
    Continue,
}

impl PrerequisiteFailurePolicy {
    /// The decision this policy always makes.
    pub fn decision(self) -> FailureDecision {
        match self {
            PrerequisiteFailurePolicy::Abort => FailureDecision::Abort,
            PrerequisiteFailurePolicy::Continue => FailureDecision::Continue,
        }
    }
}

#[async_trait]
impl FailureHandler for PrerequisiteFailurePolicy {
    async fn on_prerequisite_failure(
        &self,
        _prerequisite: &RequestDefinition,
        _response: &HttpResponse,
    ) -> FailureDecision {
        self.decision()
    }
}

impl fmt::Display for PrerequisiteFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrerequisiteFailurePolicy::Abort => write!(f, "abort"),
            PrerequisiteFailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

impl FromStr for PrerequisiteFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(PrerequisiteFailurePolicy::Abort),
            "continue" => Ok(PrerequisiteFailurePolicy::Continue),
            other => Err(format!(
                "unknown prerequisite failure policy '{}' (expected abort or continue)",
                other
            )),
        }
    }
}
