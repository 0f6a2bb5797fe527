//! Request execution.
//!
//! The chain executor never talks to the network directly; it hands each
//! resolved request to a [`Transport`]. [`native::ReqwestTransport`] (feature
//! `native`) is the reqwest-backed implementation; tests substitute their
//! own.

pub mod error;

#[cfg(feature = "native")]
pub mod native;

pub use error::RequestError;

#[cfg(feature = "native")]
pub use native::ReqwestTransport;

use crate::models::request::ResolvedRequest;
use crate::models::response::HttpResponse;
use async_trait::async_trait;
use std::collections::HashMap;

/// Performs a single HTTP exchange.
///
/// Implementations return `Ok` for every completed exchange, whatever its
/// status code; `Err` is reserved for exchanges that did not complete.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the complete response.
    async fn execute(&self, request: &ResolvedRequest) -> Result<HttpResponse, RequestError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: &ResolvedRequest) -> Result<HttpResponse, RequestError> {
        (**self).execute(request).await
    }
}

/// Adds each default header the request does not already set (any casing).
pub fn apply_default_headers(request: &mut ResolvedRequest, defaults: &HashMap<String, String>) {
    for (name, value) in defaults {
        if request.header(name).is_none() {
            request.headers.insert(name.clone(), value.clone());
        }
    }
}
