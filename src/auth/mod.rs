//! HTTP authentication.
//!
//! A request declares an [`AuthScheme`] whose credential fields may contain
//! placeholders. Once resolved, [`apply_authentication`] projects the scheme
//! onto the concrete request: an `Authorization` header for Basic and Bearer,
//! a custom header or a query parameter for API keys.

pub mod basic;
pub mod bearer;

use crate::models::request::ResolvedRequest;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Where an API key is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiKeyLocation {
    /// As a request header named after the key.
    #[default]
    Header,
    /// As a query-string parameter named after the key.
    Query,
}

/// Authentication scheme types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthScheme {
    /// No authentication
    #[default]
    None,
    /// HTTP Basic authentication (RFC 7617)
    Basic { username: String, password: String },
    /// Bearer token authentication (RFC 6750)
    Bearer { token: String },
    /// API key sent as a header or query parameter
    #[serde(rename_all = "camelCase")]
    ApiKey {
        key: String,
        value: String,
        #[serde(default)]
        location: ApiKeyLocation,
    },
}

impl AuthScheme {
    /// Returns a copy with every credential field passed through `f`.
    ///
    /// Used to resolve placeholders in credentials; the API key location is
    /// not a credential and is kept as is.
    pub fn map_credentials(&self, mut f: impl FnMut(&str) -> String) -> AuthScheme {
        match self {
            AuthScheme::None => AuthScheme::None,
            AuthScheme::Basic { username, password } => AuthScheme::Basic {
                username: f(username),
                password: f(password),
            },
            AuthScheme::Bearer { token } => AuthScheme::Bearer { token: f(token) },
            AuthScheme::ApiKey {
                key,
                value,
                location,
            } => AuthScheme::ApiKey {
                key: f(key),
                value: f(value),
                location: *location,
            },
        }
    }

    /// Credential fields in declaration order.
    pub fn credentials(&self) -> Vec<&str> {
        match self {
            AuthScheme::None => Vec::new(),
            AuthScheme::Basic { username, password } => vec![username, password],
            AuthScheme::Bearer { token } => vec![token],
            AuthScheme::ApiKey { key, value, .. } => vec![key, value],
        }
    }

    /// Short scheme name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthScheme::None => "none",
            AuthScheme::Basic { .. } => "basic",
            AuthScheme::Bearer { .. } => "bearer",
            AuthScheme::ApiKey { .. } => "apiKey",
        }
    }
}

/// Errors that can occur during authentication processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Invalid authentication format, e.g. a URL that cannot carry a query key
    InvalidFormat(String),
    /// Missing required authentication credentials
    MissingCredentials(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidFormat(msg) => write!(f, "Invalid authentication format: {}", msg),
            AuthError::MissingCredentials(msg) => write!(f, "Missing credentials: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Projects the request's resolved [`AuthScheme`] onto headers or the URL.
///
/// The scheme is taken out of `request.auth`, leaving [`AuthScheme::None`].
/// An existing `Authorization` header (any casing) is replaced for Basic and
/// Bearer.
///
/// # Examples
///
/// ```
/// use rest_chain::auth::{apply_authentication, AuthScheme};
/// use rest_chain::models::{HttpMethod, ResolvedRequest};
/// use std::collections::HashMap;
///
/// let mut request = ResolvedRequest {
///     method: HttpMethod::GET,
///     url: "https://api.example.com/me".to_string(),
///     headers: HashMap::new(),
///     body: None,
///     auth: AuthScheme::Bearer { token: "abc".to_string() },
/// };
///
/// apply_authentication(&mut request).unwrap();
/// assert_eq!(request.header("authorization"), Some("Bearer abc"));
/// assert_eq!(request.auth, AuthScheme::None);
/// ```
pub fn apply_authentication(request: &mut ResolvedRequest) -> Result<(), AuthError> {
    let scheme = std::mem::take(&mut request.auth);
    trace!("applying {} authentication", scheme.kind());

    match scheme {
        AuthScheme::None => Ok(()),
        AuthScheme::Basic { username, password } => {
            if username.is_empty() {
                return Err(AuthError::MissingCredentials(
                    "basic auth requires a username".to_string(),
                ));
            }
            request.set_header("Authorization", basic::basic_auth(&username, &password));
            Ok(())
        }
        AuthScheme::Bearer { token } => {
            if token.trim().is_empty() {
                return Err(AuthError::MissingCredentials(
                    "bearer auth requires a token".to_string(),
                ));
            }
            request.set_header("Authorization", bearer::bearer_token(&token));
            Ok(())
        }
        AuthScheme::ApiKey {
            key,
            value,
            location,
        } => {
            if key.is_empty() {
                return Err(AuthError::MissingCredentials(
                    "api key auth requires a key name".to_string(),
                ));
            }
            match location {
                ApiKeyLocation::Header => request.set_header(key, value),
                ApiKeyLocation::Query => request.url = append_query_pair(&request.url, &key, &value)?,
            }
            Ok(())
        }
    }
}

fn append_query_pair(url: &str, key: &str, value: &str) -> Result<String, AuthError> {
    let mut parsed = Url::parse(url)
        .map_err(|e| AuthError::InvalidFormat(format!("cannot add query key to '{}': {}", url, e)))?;
    parsed.query_pairs_mut().append_pair(key, value);
    Ok(parsed.into())
}
