//! Yandex Dialogs ("Alice") webhook protocol.
//!
//! Only the fields the skill reads are modelled; everything else the
//! platform sends is ignored by serde.

use alice_grocer_core::{AccountRecord, AccountStore};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Protocol version echoed in every response.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Inbound webhook request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub request: UtteranceRequest,
    pub session: SessionInfo,
    #[serde(default)]
    pub state: Option<StateSnapshot>,
    #[serde(default = "default_version")]
    pub version: String,
}

/// What the user said this turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtteranceRequest {
    /// Normalized utterance.
    #[serde(default)]
    pub command: String,
    /// Utterance exactly as recognized.
    #[serde(default)]
    pub original_utterance: String,
}

/// Conversation metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message_id: u64,
    /// Legacy per-application user id.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Authorized platform user, present when the user is logged in.
    #[serde(default)]
    pub user: Option<PlatformUser>,
    #[serde(default)]
    pub application: Option<PlatformApplication>,
    #[serde(default)]
    pub new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformUser {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformApplication {
    pub application_id: String,
}

/// Persistent state the platform stores on behalf of the skill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub user: Option<UserState>,
}

/// The per-user state blob. `users` is the account store.
///
/// The blob is whatever the platform kept from earlier turns, so a malformed
/// record is dropped rather than failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    #[serde(default, deserialize_with = "lenient_accounts")]
    pub users: AccountStore,
}

impl WebhookRequest {
    /// Stable identity of the conversation partner.
    ///
    /// Prefers the logged-in platform user, then the legacy user id, then
    /// the application (device) id, and finally the session id.
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        let session = &self.session;
        session
            .user
            .as_ref()
            .map(|u| u.user_id.as_str())
            .or(session.user_id.as_deref())
            .or_else(|| {
                session
                    .application
                    .as_ref()
                    .map(|a| a.application_id.as_str())
            })
            .unwrap_or(&session.session_id)
    }

    /// The utterance fed to the dialog engine.
    #[must_use]
    pub fn utterance(&self) -> &str {
        self.request.command.trim()
    }

    /// Take the account store out of the request, defaulting to empty.
    #[must_use]
    pub fn take_accounts(&mut self) -> AccountStore {
        self.state
            .as_mut()
            .and_then(|s| s.user.take())
            .map(|u| u.users)
            .unwrap_or_default()
    }
}

/// Outbound webhook response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub response: ResponseBody,
    pub user_state_update: UserState,
    pub version: String,
}

/// Text read out to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    pub text: String,
    pub end_session: bool,
}

impl WebhookResponse {
    /// Build a response that writes `accounts` back to the platform.
    #[must_use]
    pub fn new(text: impl Into<String>, end_session: bool, accounts: AccountStore) -> Self {
        Self {
            response: ResponseBody {
                text: text.into(),
                end_session,
            },
            user_state_update: UserState { users: accounts },
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

fn default_version() -> String {
    PROTOCOL_VERSION.to_string()
}

fn lenient_accounts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AccountStore, D::Error> {
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(AccountStore::new()),
        other => {
            warn!(kind = %json_kind(&other), "Account store is not an object, ignoring it");
            return Ok(AccountStore::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(
            |(name, entry)| match serde_json::from_value::<AccountRecord>(entry) {
                Ok(record) => Some((name, record)),
                Err(e) => {
                    warn!(account = %name, error = %e, "Dropping malformed account record");
                    None
                }
            },
        )
        .collect())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
