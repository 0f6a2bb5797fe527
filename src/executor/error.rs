//! Transport error types.

use std::fmt;

/// Errors a transport can report for a single exchange.
///
/// A completed exchange with a 4xx or 5xx status is not an error; the
/// status is part of the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Connection failures, DNS resolution errors and other network issues.
    NetworkError(String),

    /// The exchange did not complete within the configured timeout.
    Timeout,

    /// The URL could not be parsed, typically because a placeholder was
    /// left unresolved in it.
    InvalidUrl(String),

    /// Certificate validation or handshake failure.
    TlsError(String),

    /// The request could not be built from the resolved data.
    BuildError(String),

    /// Only HTTP and HTTPS are supported.
    UnsupportedProtocol(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RequestError::Timeout => write!(f, "Request timed out"),
            RequestError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            RequestError::TlsError(msg) => write!(f, "TLS/SSL error: {}", msg),
            RequestError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            RequestError::UnsupportedProtocol(protocol) => {
                write!(f, "Unsupported protocol: {}", protocol)
            }
        }
    }
}

impl std::error::Error for RequestError {}

#[cfg(feature = "native")]
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::BuildError(message)
        } else if message.contains("certificate") || message.contains("TLS") || message.contains("SSL") {
            RequestError::TlsError(message)
        } else {
            RequestError::NetworkError(message)
        }
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}
