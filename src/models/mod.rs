//! Data models for request definitions and captured responses.

pub mod request;
pub mod response;

pub use request::{HttpMethod, RequestDefinition, ResolvedRequest};
pub use response::HttpResponse;
