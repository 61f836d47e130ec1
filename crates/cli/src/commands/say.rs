//! One-shot turn with a persisted account store.
//!
//! # Usage
//!
//! ```bash
//! ag-cli say "новый" --state accounts.json
//! ag-cli say "маша 89990001122" --state accounts.json
//! ```
//!
//! The account store is read from the state file before the turn and
//! written back after it, standing in for the platform's user state.
//! Dialog progress lives on the server, so reuse the same `--user-id`.

use std::path::Path;

use alice_grocer_core::AccountStore;
use alice_grocer_skill::alice::WebhookResponse;
use url::Url;

use crate::client::{CliError, Conversation};

/// Send one utterance and persist the returned account store.
///
/// # Errors
///
/// Returns an error if the state file is unreadable or the turn fails.
pub async fn run(
    url: Url,
    user_id: &str,
    utterance: &str,
    state: Option<&Path>,
) -> Result<WebhookResponse, CliError> {
    let accounts = match state {
        Some(path) => load_accounts(path)?,
        None => AccountStore::new(),
    };

    let mut conversation = Conversation::new(url, user_id, accounts);
    let reply = conversation.say(utterance).await?;

    if let Some(path) = state {
        save_accounts(path, conversation.accounts())?;
        tracing::debug!(path = %path.display(), "Saved account store");
    }

    Ok(reply)
}

/// Read an account store, treating a missing file as empty.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_accounts(path: &Path) -> Result<AccountStore, CliError> {
    if !path.exists() {
        return Ok(AccountStore::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write an account store as pretty JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_accounts(path: &Path, accounts: &AccountStore) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(accounts)?;
    std::fs::write(path, json)?;
    Ok(())
}
