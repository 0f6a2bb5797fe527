//! Bearer token authentication (RFC 6750).

/// Formats a token into a Bearer authentication header value.
///
/// Surrounding whitespace, typically left behind by substitution, is trimmed.
///
/// ```
/// use rest_chain::auth::bearer::bearer_token;
///
/// assert_eq!(bearer_token(" abc123xyz\n"), "Bearer abc123xyz");
/// ```
pub fn bearer_token(token: &str) -> String {
    format!("Bearer {}", token.trim())
}
