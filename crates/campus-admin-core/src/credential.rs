//! Push-channel credential.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token authorizing the push-channel connection.
///
/// The dashboard never interprets the token; it is only attached to the
/// connection URL and to REST requests. `Debug` output is redacted so the
/// token does not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("secret-token"));
        assert_eq!(credential.as_str(), "secret-token");
    }

    #[test]
    fn test_serde_transparent() {
        let credential: Credential = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(credential, Credential::from("abc"));
        assert_eq!(serde_json::to_string(&credential).unwrap(), "\"abc\"");
    }
}
