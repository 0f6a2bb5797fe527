//! HTTP response data model.
//!
//! [`HttpResponse`] is what a transport returns and what the response store
//! keeps for chain references.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents an HTTP response received from a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status: u16,

    /// HTTP status text (e.g., "OK", "Not Found").
    pub status_text: String,

    /// Response headers as returned by the server.
    ///
    /// Lookups through [`HttpResponse::header`] are case-insensitive.
    pub headers: HashMap<String, String>,

    /// Response body decoded as text.
    pub body: String,

    /// Total request duration in milliseconds.
    pub time: u64,

    /// Total response size in bytes (headers and body).
    pub size: u64,
}

impl HttpResponse {
    /// Creates a new response with the given status and no headers or body.
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: HashMap::new(),
            body: String::new(),
            time: 0,
            size: 0,
        }
    }

    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gets a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Adds a header to the response.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
        self.size = self.calculate_headers_size() + self.body.len() as u64;
    }

    /// Adds a header, folding a repeated name into one comma-separated value.
    ///
    /// Names are compared case-insensitively; the first spelling is kept.
    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                self.headers.insert(name, value);
            }
        }
        self.size = self.calculate_headers_size() + self.body.len() as u64;
    }

    /// Sets the response body and recomputes the size.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
        self.size = self.calculate_headers_size() + self.body.len() as u64;
    }

    /// Approximate size of the headers in bytes.
    fn calculate_headers_size(&self) -> u64 {
        self.headers
            .iter()
            .map(|(k, v)| (k.len() + v.len() + 4) as u64) // ": " and "\r\n"
            .sum()
    }
}
