//! Caller-held account store.
//!
//! The voice platform keeps this blob in its per-user storage and sends it
//! with every request; the skill rewrites it and hands it back in
//! `user_state_update`. The JSON shape is fixed by what is already stored on
//! the platform side:
//!
//! ```json
//! { "Маша": { "number": "89990001122", "token": null, "old_token": null } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::credential::TokenPair;
use super::phone::PhoneNumber;

/// One phone-linked account, keyed by display name in the [`AccountStore`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Number SMS challenges are sent to.
    pub number: PhoneNumber,
    /// Current access token.
    #[serde(default)]
    pub token: Option<String>,
    /// Refresh token paired with `token`.
    #[serde(default)]
    pub old_token: Option<String>,
}

impl AccountRecord {
    /// A freshly added account that has never been verified.
    #[must_use]
    pub const fn unverified(number: PhoneNumber) -> Self {
        Self {
            number,
            token: None,
            old_token: None,
        }
    }

    /// The stored token pair, if both halves are present.
    #[must_use]
    pub fn token_pair(&self) -> Option<TokenPair> {
        match (&self.token, &self.old_token) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRecord")
            .field("number", &self.number)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("old_token", &self.old_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Display name to account mapping.
///
/// Names are matched exactly (case-sensitive). Ordered so prompts that list
/// the accounts read the same on every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountStore(BTreeMap<String, AccountRecord>);

impl AccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no account has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up an account by its exact display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AccountRecord> {
        self.0.get(name)
    }

    /// Whether an account with this exact display name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Display names in listing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Add (or replace) an account with no tokens on file.
    pub fn add_unverified(&mut self, name: impl Into<String>, number: PhoneNumber) {
        self.0.insert(name.into(), AccountRecord::unverified(number));
    }

    /// Store a freshly issued token pair for an account.
    ///
    /// Creates the record if the caller's blob lost it in the meantime.
    pub fn store_tokens(&mut self, name: &str, number: &PhoneNumber, tokens: &TokenPair) {
        self.0.insert(
            name.to_string(),
            AccountRecord {
                number: number.clone(),
                token: Some(tokens.access.clone()),
                old_token: Some(tokens.refresh.clone()),
            },
        );
    }

    /// Replace the access token after a refresh, keeping the refresh token.
    ///
    /// Returns `false` if no such account exists.
    pub fn rotate_access_token(&mut self, name: &str, access: impl Into<String>) -> bool {
        match self.0.get_mut(name) {
            Some(record) => {
                record.token = Some(access.into());
                true
            }
            None => false,
        }
    }
}

impl FromIterator<(String, AccountRecord)> for AccountStore {
    fn from_iter<I: IntoIterator<Item = (String, AccountRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
