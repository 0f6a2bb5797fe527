//! Pre-request chains.
//!
//! A request may declare another request as its prerequisite, which may in
//! turn declare its own. Sending the request runs the whole chain first,
//! deepest prerequisite first, storing each response so later steps can
//! reference it:
//!
//! ```text
//! login (POST /login)        -> stored as "login"
//!   └─ profile (GET /me, Authorization: Bearer {{login.response.body.token}})
//! ```

pub mod error;
pub mod executor;
pub mod policy;

pub use error::ChainError;
pub use executor::{PreRequestChainExecutor, PrerequisiteReport, SendOutcome};
pub use policy::{FailureDecision, FailureHandler, PrerequisiteFailurePolicy};

use std::fmt;

/// Steps of a prerequisite run, traced on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    ResolvingPrerequisite,
    ExecutingPrerequisite,
    Evaluating,
    Continue,
    Aborted,
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainState::Idle => "idle",
            ChainState::ResolvingPrerequisite => "resolving-prerequisite",
            ChainState::ExecutingPrerequisite => "executing-prerequisite",
            ChainState::Evaluating => "evaluating",
            ChainState::Continue => "continue",
            ChainState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
