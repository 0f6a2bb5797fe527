//! Layered variable scopes and whole-request resolution.
//!
//! Scopes are merged low to high, later layers overriding earlier ones:
//!
//! 1. workspace defaults (`.env`)
//! 2. collection variables
//! 3. active environment (enabled entries, shared entries below them)
//! 4. per-request overrides

use super::substitution::{unresolved_placeholders, ResolveError, ResolveOptions, TemplateResolver};
use super::VariableMap;
use crate::collection::CollectionStore;
use crate::models::request::{RequestDefinition, ResolvedRequest};
use crate::store::ResponseStore;
use log::trace;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves text and requests against the merged variable scopes.
#[derive(Clone)]
pub struct VariableScopeResolver {
    collections: Arc<dyn CollectionStore>,
    templates: TemplateResolver,
}

impl std::fmt::Debug for VariableScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableScopeResolver")
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}

impl VariableScopeResolver {
    /// Creates a resolver over `collections`, reading chain references from
    /// `responses`.
    pub fn new(collections: Arc<dyn CollectionStore>, responses: ResponseStore) -> Self {
        Self {
            collections,
            templates: TemplateResolver::new(responses),
        }
    }

    /// The collection collaborator.
    pub fn collections(&self) -> &Arc<dyn CollectionStore> {
        &self.collections
    }

    /// The response store chain references are read from.
    pub fn responses(&self) -> &ResponseStore {
        self.templates.store()
    }

    /// Merges every scope for `scope_id`, overrides on top.
    pub fn get_resolved_variables(
        &self,
        scope_id: Option<&str>,
        overrides: Option<&VariableMap>,
    ) -> VariableMap {
        let mut merged = self.collections.default_variables();
        merged.extend(self.collections.get_variables(scope_id));
        merged.extend(self.collections.get_active_environment_variables());
        if let Some(overrides) = overrides {
            merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        trace!(
            "merged {} variables for scope {}",
            merged.len(),
            scope_id.unwrap_or("<none>")
        );
        merged
    }

    /// Resolves placeholders in `text` against the merged scopes.
    pub fn resolve_text(
        &self,
        text: &str,
        scope_id: Option<&str>,
        overrides: Option<&VariableMap>,
        options: ResolveOptions,
    ) -> Result<String, ResolveError> {
        let variables = self.get_resolved_variables(scope_id, overrides);
        self.templates.resolve(text, &variables, options)
    }

    /// Produces a concrete request from a stored definition.
    ///
    /// The URL, every header value, the body and the auth credentials are
    /// resolved; header names, the method and the definition itself are left
    /// untouched. In strict mode every marker left in any field is reported in
    /// a single error, in field order (URL, headers by name, body, auth).
    pub fn resolve_request(
        &self,
        request: &RequestDefinition,
        overrides: Option<&VariableMap>,
        options: ResolveOptions,
    ) -> Result<ResolvedRequest, ResolveError> {
        let variables = self.get_resolved_variables(request.collection_id.as_deref(), overrides);
        let lenient = ResolveOptions {
            fail_on_unresolved: false,
            ..options
        };
        let resolve = |text: &str| {
            self.templates
                .resolve(text, &variables, lenient)
                .unwrap_or_else(|_| text.to_string())
        };

        let mut header_names: Vec<&String> = request.headers.keys().collect();
        header_names.sort();
        let headers: HashMap<String, String> = header_names
            .iter()
            .map(|name| ((*name).clone(), resolve(&request.headers[*name])))
            .collect();

        let resolved = ResolvedRequest {
            method: request.method,
            url: resolve(&request.url),
            body: request.body.as_deref().map(resolve),
            auth: request.auth.map_credentials(resolve),
            headers,
        };

        if options.fail_on_unresolved {
            let mut fields: Vec<&str> = vec![resolved.url.as_str()];
            fields.extend(header_names.iter().map(|name| resolved.headers[*name].as_str()));
            fields.extend(resolved.body.as_deref());
            fields.extend(resolved.auth.credentials());

            let mut unresolved: Vec<String> = Vec::new();
            for name in fields.into_iter().flat_map(unresolved_placeholders) {
                if !unresolved.contains(&name) {
                    unresolved.push(name);
                }
            }
            if !unresolved.is_empty() {
                return Err(ResolveError::UnresolvedVariables(unresolved));
            }
        }

        Ok(resolved)
    }
}
