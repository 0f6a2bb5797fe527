//! Template resolution and request chaining for HTTP request collections.
//!
//! Saved requests contain `{{placeholder}}` markers. Before a request is
//! sent, every marker is replaced from, in priority order:
//!
//! - the merged variable scopes (workspace defaults, collection, active
//!   environment, per-request overrides)
//! - a chain reference into a previously stored response, such as
//!   `{{login.response.body.data.token}}`
//! - a built-in directive such as `{{$guid}}` or `{{$timestamp -1 d}}`
//!
//! A request may declare a prerequisite request. Sending it first runs the
//! prerequisite chain bottom-up, storing each response under the
//! prerequisite's name so later steps can reference it.
//!
//! # Architecture
//!
//! - **models**: request definitions, resolved requests and responses
//! - **variables**: placeholder substitution, built-in directives, scopes
//! - **store**: the shared response store and chain-reference navigation
//! - **collection**: the collection collaborator and an in-memory store
//! - **environment**: environment files, `.env` defaults, active selection
//! - **auth**: Basic, Bearer and API-key projection
//! - **executor**: the transport seam and the reqwest transport
//! - **chain**: the prerequisite chain executor
//! - **config**: engine settings
//!
//! # Example
//!
//! ```
//! use rest_chain::collection::{Collection, InMemoryCollectionStore};
//! use rest_chain::models::{HttpMethod, RequestDefinition};
//! use rest_chain::store::ResponseStore;
//! use rest_chain::variables::{ResolveOptions, VariableScopeResolver};
//! use std::sync::Arc;
//!
//! let mut collection = Collection::new("api", "API");
//! collection.set_variable("baseUrl", "https://api.example.com");
//!
//! let mut store = InMemoryCollectionStore::new();
//! store.add_collection(collection);
//!
//! let resolver = VariableScopeResolver::new(Arc::new(store), ResponseStore::new());
//! let request = RequestDefinition::new("users", HttpMethod::GET, "{{baseUrl}}/users")
//!     .in_collection("api");
//!
//! let resolved = resolver
//!     .resolve_request(&request, None, ResolveOptions::default())
//!     .unwrap();
//! assert_eq!(resolved.url, "https://api.example.com/users");
//! ```

pub mod auth;
pub mod chain;
pub mod collection;
pub mod config;
pub mod environment;
pub mod executor;
pub mod models;
pub mod store;
pub mod variables;

pub use chain::{ChainError, PreRequestChainExecutor, SendOutcome};
pub use store::ResponseStore;
pub use variables::{ResolveOptions, TemplateResolver, VariableScopeResolver};
