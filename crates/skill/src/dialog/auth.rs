//! Account enrollment, selection and SMS verification.

use alice_grocer_core::{AccountStore, PhoneNumber};
use tracing::{debug, info, warn};

use super::enrollment::Enrollment;
use super::intent::{Intent, Stage};
use super::replies;
use super::state::{AuthorizedUser, DialogState, Session};
use super::Dialog;

impl Dialog {
    pub(super) async fn authenticate(
        &self,
        session: &mut Session,
        utterance: &str,
        accounts: &mut AccountStore,
    ) -> String {
        let stage = match session.state {
            DialogState::AddingAccount => Stage::Enrollment,
            DialogState::AwaitingSms { .. } => Stage::CodeEntry,
            _ => Stage::SignIn,
        };
        let intent = self.classify(utterance, stage);

        if intent == Intent::AddAccount {
            session.state = DialogState::AddingAccount;
            return replies::ADD_ACCOUNT_PROMPT.to_string();
        }

        match (&session.state, intent) {
            (DialogState::AddingAccount, _) => enroll(session, utterance, accounts),

            (DialogState::AwaitingSms { name, phone }, Intent::SubmitCode(code)) => {
                let (name, phone) = (name.clone(), phone.clone());
                // Saying an account name again restarts selection
                if accounts.contains(&code) {
                    return self.select_account(session, &code, accounts).await;
                }
                self.verify_code(session, name, phone, &code, accounts)
                    .await
            }

            _ if accounts.is_empty() => {
                session.state = DialogState::AddingAccount;
                replies::ADD_ACCOUNT_PROMPT.to_string()
            }

            (DialogState::AwaitingAuth, Intent::SelectUser(name)) => {
                if accounts.contains(&name) {
                    self.select_account(session, &name, accounts).await
                } else {
                    replies::ACCOUNT_NOT_FOUND.to_string()
                }
            }

            (DialogState::Idle, Intent::SelectUser(name)) if accounts.contains(&name) => {
                self.select_account(session, &name, accounts).await
            }

            _ => {
                session.state = DialogState::AwaitingAuth;
                replies::choose_account(accounts.names())
            }
        }
    }

    /// Authenticate a known account: refresh stored tokens, else send an SMS.
    async fn select_account(
        &self,
        session: &mut Session,
        name: &str,
        accounts: &mut AccountStore,
    ) -> String {
        let Some(record) = accounts.get(name) else {
            return replies::ACCOUNT_NOT_FOUND.to_string();
        };
        let phone = record.number.clone();

        if let Some(tokens) = record.token_pair() {
            match self.commerce.refresh_token(&tokens).await {
                Ok(Some(access)) => {
                    accounts.rotate_access_token(name, access.clone());
                    session.state = DialogState::Browsing {
                        user: AuthorizedUser::new(name, phone, access),
                    };
                    info!("Signed in with refreshed token");
                    return replies::AUTH_SUCCESS.to_string();
                }
                Ok(None) => debug!("Stored tokens rejected, falling back to SMS"),
                Err(e) => warn!(error = %e, "Token refresh failed, falling back to SMS"),
            }
        }

        if let Err(e) = self
            .commerce
            .send_sms_code(&phone, session.workflow.as_ref())
            .await
        {
            warn!(error = %e, "Failed to send SMS code");
        }

        session.state = DialogState::AwaitingSms {
            name: name.to_string(),
            phone,
        };
        replies::sms_sent(name)
    }

    async fn verify_code(
        &self,
        session: &mut Session,
        name: String,
        phone: PhoneNumber,
        code: &str,
        accounts: &mut AccountStore,
    ) -> String {
        match self
            .commerce
            .verify_sms_code(&phone, code, session.workflow.as_ref())
            .await
        {
            Ok(Some(tokens)) => {
                accounts.store_tokens(&name, &phone, &tokens);
                session.state = DialogState::Browsing {
                    user: AuthorizedUser::new(name, phone, tokens.access),
                };
                info!("Signed in with SMS code");
                replies::AUTH_SUCCESS.to_string()
            }
            Ok(None) => replies::INVALID_CODE.to_string(),
            Err(e) => {
                warn!(error = %e, "SMS code verification failed");
                replies::VERIFY_FAILED.to_string()
            }
        }
    }
}

fn enroll(session: &mut Session, utterance: &str, accounts: &mut AccountStore) -> String {
    match Enrollment::parse(utterance) {
        Ok(Enrollment { name, phone }) => {
            let reply = replies::account_added(&name);
            accounts.add_unverified(name, phone);
            session.state = DialogState::AwaitingAuth;
            reply
        }
        Err(e) => {
            debug!(error = %e, "Could not parse new account");
            replies::ADD_ACCOUNT_RETRY.to_string()
        }
    }
}
