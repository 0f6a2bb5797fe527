//! Collections of saved requests and the variable scopes around them.
//!
//! The resolution engine never owns requests or environments itself; it asks
//! a [`CollectionStore`] for them. [`InMemoryCollectionStore`] is the
//! implementation used by the command-line tool and the tests.

use crate::environment::EnvironmentSession;
use crate::models::request::RequestDefinition;
use crate::variables::VariableMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Source of requests and of the variable scopes below request overrides.
pub trait CollectionStore: Send + Sync {
    /// Workspace-wide defaults, the lowest scope.
    fn default_variables(&self) -> VariableMap {
        VariableMap::new()
    }

    /// Variables of the given collection scope; empty for `None` or an
    /// unknown scope.
    fn get_variables(&self, scope_id: Option<&str>) -> VariableMap;

    /// Enabled variables of the active environment, shared entries included;
    /// empty when no environment is active.
    fn get_active_environment_variables(&self) -> VariableMap;

    /// Looks up a request by id.
    fn find_prerequisite(&self, id: &str) -> Option<RequestDefinition>;
}

/// A named group of requests sharing a variable scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Scope id referenced by [`RequestDefinition::collection_id`].
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Collection-scoped variables.
    #[serde(default)]
    pub variables: VariableMap,
    /// Requests of the collection.
    #[serde(default)]
    pub requests: Vec<RequestDefinition>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets a collection variable.
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Adds a request, assigning it to this collection's scope when it has none.
    pub fn add_request(&mut self, mut request: RequestDefinition) {
        if request.collection_id.is_none() {
            request.collection_id = Some(self.id.clone());
        }
        self.requests.push(request);
    }
}

/// On-disk layout of a workspace file: `{ "collections": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceFile {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

/// [`CollectionStore`] over collections held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCollectionStore {
    collections: HashMap<String, Collection>,
    requests: HashMap<String, RequestDefinition>,
    environments: EnvironmentSession,
    defaults: VariableMap,
}

impl InMemoryCollectionStore {
    /// Creates an empty store with no environments and no defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `session` for active-environment lookups.
    pub fn with_environments(mut self, session: EnvironmentSession) -> Self {
        self.environments = session;
        self
    }

    /// Sets the workspace defaults, typically read from `.env`.
    pub fn with_defaults(mut self, defaults: VariableMap) -> Self {
        self.defaults = defaults;
        self
    }

    /// Reads collections from a workspace JSON file.
    pub fn load_workspace_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read workspace file {}: {}", path.display(), e))?;
        let workspace: WorkspaceFile = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse workspace file {}: {}", path.display(), e))?;

        let mut store = Self::new();
        for collection in workspace.collections {
            store.add_collection(collection);
        }
        debug!(
            "loaded {} collections with {} requests from {}",
            store.collections.len(),
            store.requests.len(),
            path.display()
        );
        Ok(store)
    }

    /// Adds a collection and indexes its requests by id.
    ///
    /// A later request with an id already present replaces the earlier one.
    pub fn add_collection(&mut self, collection: Collection) {
        for request in &collection.requests {
            let mut request = request.clone();
            if request.collection_id.is_none() {
                request.collection_id = Some(collection.id.clone());
            }
            self.requests.insert(request.id.clone(), request);
        }
        self.collections.insert(collection.id.clone(), collection);
    }

    /// Adds a request outside any collection.
    pub fn add_request(&mut self, request: RequestDefinition) {
        self.requests.insert(request.id.clone(), request);
    }

    /// The environment session backing this store.
    pub fn environments(&self) -> &EnvironmentSession {
        &self.environments
    }

    /// Looks up a collection by id.
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.get(id)
    }

    /// Ids of every known request, sorted.
    pub fn request_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.requests.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl CollectionStore for InMemoryCollectionStore {
    fn default_variables(&self) -> VariableMap {
        self.defaults.clone()
    }

    fn get_variables(&self, scope_id: Option<&str>) -> VariableMap {
        scope_id
            .and_then(|id| self.collections.get(id))
            .map(|collection| collection.variables.clone())
            .unwrap_or_default()
    }

    fn get_active_environment_variables(&self) -> VariableMap {
        self.environments.active_variables()
    }

    fn find_prerequisite(&self, id: &str) -> Option<RequestDefinition> {
        self.requests.get(id).cloned()
    }
}
