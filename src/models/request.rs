//! HTTP request data models.
//!
//! A [`RequestDefinition`] is a request as the user saved it in a collection,
//! with `{{placeholder}}` markers still in place. A [`ResolvedRequest`] is the
//! concrete request produced from it, ready to hand to a transport.

use crate::auth::AuthScheme;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP request method.
///
/// Represents all standard HTTP methods as defined in RFC 7231 and RFC 5789.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    #[default]
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
    /// HTTP OPTIONS method - describe communication options
    OPTIONS,
    /// HTTP HEAD method - retrieve headers only
    HEAD,
    /// HTTP TRACE method - perform a message loop-back test
    TRACE,
    /// HTTP CONNECT method - establish a tunnel to the server
    CONNECT,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::CONNECT => "CONNECT",
        }
    }

    /// Parses a method name case-insensitively.
    ///
    /// Returns `None` for anything that is not a standard method.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            "TRACE" => Some(HttpMethod::TRACE),
            "CONNECT" => Some(HttpMethod::CONNECT),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request as stored in a collection.
///
/// URL, header values, body and auth credentials may all contain
/// `{{placeholder}}` markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefinition {
    /// Unique identifier within the workspace.
    ///
    /// Prerequisite references and cycle detection work on this id.
    pub id: String,

    /// Declared name used as the key for chain references
    /// (`{{<name>.response.body...}}`).
    ///
    /// Requests without a name can run but their responses are not stored.
    #[serde(default)]
    pub name: Option<String>,

    /// HTTP method (GET, POST, PUT, DELETE, etc.).
    #[serde(default)]
    pub method: HttpMethod,

    /// Target URL, possibly containing placeholders.
    pub url: String,

    /// Request headers. Only values are subject to substitution.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Optional raw request body.
    #[serde(default)]
    pub body: Option<String>,

    /// Authentication to project onto headers or the query string.
    #[serde(default)]
    pub auth: AuthScheme,

    /// Id of a request that has to run before this one.
    #[serde(default)]
    pub prerequisite: Option<String>,

    /// Collection this request belongs to; selects the collection variable scope.
    #[serde(default)]
    pub collection_id: Option<String>,
}

impl RequestDefinition {
    /// Creates a new request definition with no headers, body, auth or prerequisite.
    pub fn new(id: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            auth: AuthScheme::None,
            prerequisite: None,
            collection_id: None,
        }
    }

    /// Sets the declared name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares a prerequisite request by id.
    pub fn with_prerequisite(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisite = Some(prerequisite.into());
        self
    }

    /// Assigns the request to a collection scope.
    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    /// Sets the authentication scheme.
    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    /// Adds a header to the request.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    /// Name used in logs and error messages: the declared name if any, else the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A fully resolved request ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Concrete URL.
    pub url: String,
    /// Concrete headers.
    pub headers: HashMap<String, String>,
    /// Concrete body, if any.
    pub body: Option<String>,
    /// Resolved credentials not yet projected onto headers or the query.
    ///
    /// [`crate::auth::apply_authentication`] consumes this and leaves `None`.
    #[serde(default)]
    pub auth: AuthScheme,
}

impl ResolvedRequest {
    /// Gets a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces any header with the same case-insensitive name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }
}
