//! Variable resolution.
//!
//! [`substitution`] replaces `{{...}}` markers in text, [`system`] evaluates
//! built-in directives such as `{{$guid}}`, and [`scope`] merges the layered
//! variable scopes and resolves whole requests.

pub mod scope;
pub mod substitution;
pub mod system;

use std::collections::HashMap;

/// Flat name to value map used at every scope.
pub type VariableMap = HashMap<String, String>;

pub use scope::VariableScopeResolver;
pub use substitution::{
    find_placeholders, substitute_variables, unresolved_placeholders, Placeholder, ResolveError,
    ResolveOptions, TemplateResolver, MAX_RECURSION_DEPTH,
};
pub use system::{resolve_directive, Directive};
