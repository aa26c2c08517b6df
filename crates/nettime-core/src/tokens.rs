//! Session token type.

use std::fmt;

/// The session token returned by the login endpoint.
///
/// The server sends it back in the `sessionID` cookie of every request.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in the session cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the server handed back an empty token.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("0f3a9c7e-session");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("0f3a9c7e"));
        assert!(debug.contains("[REDACTED]"));
    }
}
