//! Minimal voice-platform client for the skill webhook.

use alice_grocer_core::AccountStore;
use alice_grocer_skill::alice::{
    PROTOCOL_VERSION, PlatformUser, SessionInfo, StateSnapshot, UserState, UtteranceRequest,
    WebhookRequest, WebhookResponse,
};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Errors talking to the webhook or handling local state.
#[derive(Debug, Error)]
pub enum CliError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook answered with a non-success status.
    #[error("Webhook returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Webhook URL could not be parsed.
    #[error("Invalid webhook URL {0}")]
    Url(String),

    /// A state file is not valid JSON.
    #[error("Invalid state file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Plays the voice platform for one conversation.
///
/// Like the real platform, it keeps the account store the skill returns and
/// sends it back with the next turn.
pub struct Conversation {
    http: reqwest::Client,
    url: Url,
    user_id: String,
    session_id: String,
    message_id: u64,
    accounts: AccountStore,
}

impl Conversation {
    #[must_use]
    pub fn new(url: Url, user_id: impl Into<String>, accounts: AccountStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            user_id: user_id.into(),
            session_id: Uuid::new_v4().to_string(),
            message_id: 0,
            accounts,
        }
    }

    /// The account store as last returned by the skill.
    #[must_use]
    pub const fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Build the request the platform would send for `utterance`.
    #[must_use]
    pub fn request(&self, utterance: &str) -> WebhookRequest {
        WebhookRequest {
            request: UtteranceRequest {
                command: utterance.trim().to_lowercase(),
                original_utterance: utterance.to_string(),
            },
            session: SessionInfo {
                session_id: self.session_id.clone(),
                message_id: self.message_id,
                user_id: None,
                user: Some(PlatformUser {
                    user_id: self.user_id.clone(),
                }),
                application: None,
                new: self.message_id == 0,
            },
            state: Some(StateSnapshot {
                user: Some(UserState {
                    users: self.accounts.clone(),
                }),
            }),
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    /// Send one turn and keep the returned account store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the webhook rejects it.
    pub async fn say(&mut self, utterance: &str) -> Result<WebhookResponse, CliError> {
        let request = self.request(utterance);
        tracing::debug!(message_id = self.message_id, "Sending turn");

        let response = self.http.post(self.url.clone()).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CliError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let reply: WebhookResponse = response.json().await?;
        self.message_id += 1;
        self.accounts = reply.user_state_update.users.clone();
        Ok(reply)
    }
}
