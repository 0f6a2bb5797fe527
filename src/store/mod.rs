//! In-memory store of the most recent response per request name.
//!
//! The store is created once by the host and shared by cloning the handle.
//! Entries are `Arc`s that are replaced wholesale, never mutated in place, so
//! a reader holding an entry always sees a complete response.
//!
//! # Example
//!
//! ```
//! use rest_chain::models::HttpResponse;
//! use rest_chain::store::ResponseStore;
//!
//! let store = ResponseStore::new();
//! let mut response = HttpResponse::new(200, "OK");
//! response.set_body(r#"{"data":{"token":"abc"}}"#);
//! store.store("login", response);
//!
//! assert_eq!(
//!     store.resolve_reference("login.response.body.data.token"),
//!     Some("abc".to_string())
//! );
//! assert_eq!(store.resolve_reference("logout.response.status"), None);
//! ```

pub mod path;

pub use path::{ChainReference, ResponseField};

use crate::models::response::HttpResponse;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to the response store.
#[derive(Debug, Clone, Default)]
pub struct ResponseStore {
    entries: Arc<RwLock<HashMap<String, Arc<HttpResponse>>>>,
}

impl ResponseStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `response` under `name`, replacing any previous entry.
    pub fn store(&self, name: impl Into<String>, response: HttpResponse) {
        let name = name.into();
        debug!("storing response for '{}' (status {})", name, response.status);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::new(response));
    }

    /// Gets the most recent response stored under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<HttpResponse>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Resolves a `<name>.response.<field>[.<subpath>]` expression.
    ///
    /// Returns `None` if the expression is malformed, nothing is stored
    /// under the name, or navigation into the response fails.
    pub fn resolve_reference(&self, path: &str) -> Option<String> {
        let reference = ChainReference::parse(path)?;
        let Some(response) = self.get(&reference.request_name) else {
            trace!("no stored response for '{}'", reference.request_name);
            return None;
        };
        reference.extract(&response)
    }

    /// Removes the entry stored under `name`, returning it if present.
    pub fn clear(&self, name: &str) -> Option<Arc<HttpResponse>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    /// Removes every stored response.
    pub fn clear_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Names with a stored response, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Number of stored responses.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
