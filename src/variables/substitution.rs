//! Placeholder substitution engine.
//!
//! Replaces `{{content}}` markers in request text. Each marker is resolved,
//! in order, from the explicit variable map, from a stored response (chain
//! reference), or from a built-in directive. Markers nothing can resolve are
//! left exactly as written so the user can see what failed.
//!
//! Substitution runs in whole-text passes until a pass changes nothing or the
//! configured depth is reached, which lets variables expand into further
//! placeholders while guaranteeing termination on self-reference.

use super::system::Directive;
use super::VariableMap;
use crate::config::EngineConfig;
use crate::store::ResponseStore;
use log::trace;
use std::fmt;

/// Default number of substitution passes.
pub const MAX_RECURSION_DEPTH: usize = 10;

/// Options for a single resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of whole-text passes.
    pub max_depth: usize,
    /// Report remaining markers as [`ResolveError::UnresolvedVariables`].
    pub fail_on_unresolved: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_RECURSION_DEPTH,
            fail_on_unresolved: false,
        }
    }
}

impl ResolveOptions {
    /// Options taken from the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_resolve_depth,
            fail_on_unresolved: config.fail_on_unresolved,
        }
    }

    /// Same options with unresolved markers reported as an error.
    pub fn strict(self) -> Self {
        Self {
            fail_on_unresolved: true,
            ..self
        }
    }
}

/// Errors that can occur during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Markers that remained after the last pass, de-duplicated, in order of
    /// first appearance.
    UnresolvedVariables(Vec<String>),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnresolvedVariables(names) => {
                let markers: Vec<String> = names.iter().map(|n| format!("{{{{{}}}}}", n)).collect();
                write!(f, "Unresolved variables: {}", markers.join(", "))
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// A `{{...}}` marker found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    /// The marker exactly as written, braces included.
    pub raw: &'a str,
    /// Trimmed content between the braces.
    pub name: &'a str,
}

/// Finds every placeholder in `text`, left to right.
///
/// A placeholder is `{{`, one or more characters that are neither `{` nor
/// `}`, then `}}`. Nesting is not supported: in `{{{a}}}` only `{{a}}` is a
/// placeholder.
pub fn find_placeholders(text: &str) -> Vec<Placeholder<'_>> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            if let Some(end) = match_placeholder(bytes, i) {
                found.push(Placeholder {
                    start: i,
                    end,
                    raw: &text[i..end],
                    name: text[i + 2..end - 2].trim(),
                });
                i = end;
                continue;
            }
        }
        i += 1;
    }

    found
}

/// Returns the end offset of a placeholder opening at `start`, if any.
fn match_placeholder(bytes: &[u8], start: usize) -> Option<usize> {
    let content_start = start + 2;
    let mut j = content_start;

    while j < bytes.len() {
        match bytes[j] {
            b'{' => return None,
            b'}' => {
                let closed = j > content_start && bytes.get(j + 1) == Some(&b'}');
                return closed.then_some(j + 2);
            }
            _ => j += 1,
        }
    }

    None
}

/// Lists the distinct placeholder names still present in `text`.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for placeholder in find_placeholders(text) {
        if !names.iter().any(|n| n == placeholder.name) {
            names.push(placeholder.name.to_string());
        }
    }
    names
}

/// Resolves placeholders against a variable map and a response store.
#[derive(Debug, Clone, Default)]
pub struct TemplateResolver {
    store: ResponseStore,
}

impl TemplateResolver {
    /// Creates a resolver reading chain references from `store`.
    pub fn new(store: ResponseStore) -> Self {
        Self { store }
    }

    /// The response store chain references are read from.
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    /// Resolves a single placeholder's trimmed content.
    ///
    /// Priority order:
    /// 1. Explicit variables (exact, case-sensitive key)
    /// 2. Chain references (`name.response.field...`)
    /// 3. Built-in directives (`$guid`, `$timestamp`, ...)
    pub fn resolve_placeholder(&self, name: &str, variables: &VariableMap) -> Option<String> {
        if let Some(value) = variables.get(name) {
            return Some(value.clone());
        }

        if let Some(value) = self.store.resolve_reference(name) {
            return Some(value);
        }

        Directive::parse(name).and_then(|directive| directive.resolve())
    }

    /// Resolves all placeholders in `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rest_chain::store::ResponseStore;
    /// use rest_chain::variables::{ResolveOptions, TemplateResolver, VariableMap};
    ///
    /// let resolver = TemplateResolver::new(ResponseStore::new());
    /// let mut variables = VariableMap::new();
    /// variables.insert("baseUrl".to_string(), "https://api.example.com".to_string());
    ///
    /// let result = resolver
    ///     .resolve("GET {{baseUrl}}/users/{{id}}", &variables, ResolveOptions::default())
    ///     .unwrap();
    /// assert_eq!(result, "GET https://api.example.com/users/{{id}}");
    /// ```
    pub fn resolve(
        &self,
        text: &str,
        variables: &VariableMap,
        options: ResolveOptions,
    ) -> Result<String, ResolveError> {
        let mut current = text.to_string();

        for pass in 0..options.max_depth {
            if !current.contains("{{") {
                break;
            }
            let next = self.substitute_pass(&current, variables);
            if next == current {
                break;
            }
            trace!("substitution pass {} changed text", pass + 1);
            current = next;
        }

        if options.fail_on_unresolved {
            let unresolved = unresolved_placeholders(&current);
            if !unresolved.is_empty() {
                return Err(ResolveError::UnresolvedVariables(unresolved));
            }
        }

        Ok(current)
    }

    /// Runs one left-to-right substitution pass.
    fn substitute_pass(&self, text: &str, variables: &VariableMap) -> String {
        let placeholders = find_placeholders(text);
        if placeholders.is_empty() {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len() + text.len() / 4);
        let mut last_match_end = 0;

        for placeholder in placeholders {
            result.push_str(&text[last_match_end..placeholder.start]);
            match self.resolve_placeholder(placeholder.name, variables) {
                Some(value) => result.push_str(&value),
                None => result.push_str(placeholder.raw),
            }
            last_match_end = placeholder.end;
        }

        result.push_str(&text[last_match_end..]);
        result
    }
}

/// Substitutes placeholders using only variables and directives.
///
/// Convenience for callers without a response store; unresolved markers are
/// kept.
pub fn substitute_variables(text: &str, variables: &VariableMap) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }

    TemplateResolver::default()
        .resolve(text, variables, ResolveOptions::default())
        .unwrap_or_else(|_| text.to_string())
}
