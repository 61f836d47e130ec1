//! Commerce platform credentials.

use serde::{Deserialize, Serialize};

/// Access and refresh token issued after a successful SMS verification.
///
/// Implements `Debug` manually so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token sent as `Authorization: JWT <access>`.
    pub access: String,
    /// Token that buys a new access token without another SMS.
    pub refresh: String,
}

impl TokenPair {
    /// Create a token pair.
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}
