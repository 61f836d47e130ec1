//! Conversational state machine.
//!
//! # Architecture
//!
//! - [`Session`] holds a [`DialogState`] and the purchase workflow handle
//! - [`Dialog::respond`] runs one turn: picks a branch by state, classifies
//!   the utterance with an [`IntentClassifier`], calls the commerce platform
//!   through [`CommerceApi`], and returns the text to speak
//! - [`SessionRegistry`] maps conversation identity to sessions
//!
//! # Branch priority
//!
//! Exactly one branch runs per turn, chosen by state:
//!
//! 1. `Ended`: farewell
//! 2. `AwaitingPayment`: payment confirmation
//! 3. `ConfirmingOrder`: order confirmation
//! 4. `Browsing`: shopping commands
//! 5. everything else: authentication
//!
//! Remote failures never abort a turn; they are logged and turned into a
//! reply that differs from the "nothing there" reply.

mod auth;
mod checkout;
mod enrollment;
mod intent;
mod keywords;
mod registry;
pub mod replies;
mod shopping;
mod state;

#[cfg(test)]
pub(crate) mod fake;

pub use enrollment::{Enrollment, EnrollmentError};
pub use intent::{Intent, IntentClassifier, Stage};
pub use keywords::{KeywordClassifier, Lexicon};
pub use registry::{SessionRegistry, SharedSession};
pub use state::{AuthorizedUser, DialogState, Session};

use std::sync::Arc;

use alice_grocer_core::AccountStore;
use tracing::{debug, instrument};

use crate::commerce::CommerceApi;

/// Text to speak and whether the platform should close the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub end_session: bool,
}

/// Runs conversation turns against the commerce platform.
#[derive(Clone)]
pub struct Dialog {
    commerce: Arc<dyn CommerceApi>,
    classifier: Arc<dyn IntentClassifier>,
}

impl Dialog {
    #[must_use]
    pub fn new(commerce: Arc<dyn CommerceApi>, classifier: Arc<dyn IntentClassifier>) -> Self {
        Self {
            commerce,
            classifier,
        }
    }

    /// Dialog with the default keyword vocabulary.
    #[must_use]
    pub fn with_keywords(commerce: Arc<dyn CommerceApi>) -> Self {
        Self::new(commerce, Arc::new(KeywordClassifier::default()))
    }

    /// Run one turn.
    ///
    /// Mutates `session` and `accounts` in place; the caller writes
    /// `accounts` back to the platform.
    #[instrument(skip_all, fields(state = session.state.name()))]
    pub async fn respond(
        &self,
        session: &mut Session,
        utterance: &str,
        accounts: &mut AccountStore,
    ) -> Reply {
        let utterance = utterance.trim();

        let text = match session.state {
            DialogState::Ended => replies::FAREWELL.to_string(),
            DialogState::AwaitingPayment { .. } => self.confirm_payment(session, utterance).await,
            DialogState::ConfirmingOrder { .. } => self.confirm_order(session, utterance).await,
            DialogState::Browsing { .. } => self.shop(session, utterance).await,
            DialogState::Idle
            | DialogState::AddingAccount
            | DialogState::AwaitingAuth
            | DialogState::AwaitingSms { .. } => {
                self.authenticate(session, utterance, accounts).await
            }
        };

        debug!(next_state = session.state.name(), "Turn complete");

        Reply {
            text,
            end_session: session.state.is_ended(),
        }
    }

    fn classify(&self, utterance: &str, stage: Stage) -> Intent {
        self.classifier.classify(utterance, stage)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alice_grocer_core::AccountStore;
    use secrecy::ExposeSecret;

    use super::fake::{FakeCommerce, dialog, masha, session_in, unverified_masha};
    use super::*;

    #[tokio::test]
    async fn test_enroll_and_sign_in_conversation() {
        let fake = Arc::new(FakeCommerce::default());
        let dialog = dialog(&fake);
        let mut session = Session::new();
        let mut accounts = AccountStore::new();

        dialog.respond(&mut session, "новый", &mut accounts).await;
        assert!(matches!(session.state, DialogState::AddingAccount));

        dialog
            .respond(&mut session, "Маша 89990001122", &mut accounts)
            .await;
        assert!(matches!(session.state, DialogState::AwaitingAuth));
        assert_eq!(accounts, unverified_masha());
        assert_eq!(
            serde_json::to_value(&accounts).unwrap(),
            serde_json::json!({
                "Маша": { "number": "89990001122", "token": null, "old_token": null }
            })
        );

        dialog.respond(&mut session, "Маша", &mut accounts).await;
        assert!(
            matches!(&session.state, DialogState::AwaitingSms { name, .. } if name == "Маша")
        );
        assert_eq!(fake.call_names(), vec!["send_sms_code"]);

        let reply = dialog.respond(&mut session, "1234", &mut accounts).await;
        assert_eq!(reply.text, replies::AUTH_SUCCESS);
        assert!(!reply.end_session);
        let user = session.state.user().unwrap();
        assert_eq!(user.token.expose_secret(), "access-sms");
        assert_eq!(
            accounts.get("Маша").unwrap().token.as_deref(),
            Some("access-sms")
        );

        let calls_before = fake.calls().len();
        let reply = dialog.respond(&mut session, "новинки", &mut accounts).await;
        assert_eq!(reply.text, replies::new_arrivals());
        assert_eq!(fake.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_checkout_conversation_ends_session() {
        let fake = Arc::new(FakeCommerce::default());
        let dialog = dialog(&fake);
        let mut session = session_in(DialogState::Browsing { user: masha() });
        let mut accounts = AccountStore::new();

        for utterance in ["добавь молоко", "достаточно", "да"] {
            let reply = dialog.respond(&mut session, utterance, &mut accounts).await;
            assert!(!reply.end_session, "{utterance}");
        }
        assert!(matches!(session.state, DialogState::AwaitingPayment { .. }));

        let reply = dialog.respond(&mut session, "да", &mut accounts).await;
        assert!(reply.end_session);
        assert!(session.state.is_ended());

        let reply = dialog.respond(&mut session, "новинки", &mut accounts).await;
        assert_eq!(reply.text, replies::FAREWELL);
        assert!(reply.end_session);
    }

    #[tokio::test]
    async fn test_ended_session_makes_no_calls() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = session_in(DialogState::Ended);
        let mut accounts = unverified_masha();

        let reply = dialog(&fake)
            .respond(&mut session, "новый", &mut accounts)
            .await;

        assert_eq!(reply.text, replies::FAREWELL);
        assert!(session.state.is_ended());
        assert!(fake.calls().is_empty());
        assert_eq!(accounts, unverified_masha());
    }

    #[tokio::test]
    async fn test_signed_in_user_cannot_trigger_auth_branch() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = session_in(DialogState::Browsing { user: masha() });
        let mut accounts = unverified_masha();

        let reply = dialog(&fake)
            .respond(&mut session, "новый", &mut accounts)
            .await;

        assert_eq!(reply.text, replies::UNKNOWN_COMMAND);
        assert!(matches!(session.state, DialogState::Browsing { .. }));
    }

    #[tokio::test]
    async fn test_custom_classifier_is_used() {
        struct AlwaysBrowse;

        impl IntentClassifier for AlwaysBrowse {
            fn classify(&self, _utterance: &str, _stage: Stage) -> Intent {
                Intent::Browse
            }
        }

        let fake = Arc::new(FakeCommerce::default());
        let dialog = Dialog::new(fake, Arc::new(AlwaysBrowse));
        let mut session = session_in(DialogState::Browsing { user: masha() });

        let reply = dialog
            .respond(&mut session, "что угодно", &mut AccountStore::new())
            .await;

        assert_eq!(reply.text, replies::new_arrivals());
    }
}
