//! Per-conversation session state.

use alice_grocer_core::{PhoneNumber, Price, WorkflowHandle};
use secrecy::SecretString;

/// A user who has completed authentication this session.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub name: String,
    pub phone: PhoneNumber,
    pub token: SecretString,
}

impl AuthorizedUser {
    #[must_use]
    pub fn new(name: impl Into<String>, phone: PhoneNumber, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone,
            token: SecretString::from(token.into()),
        }
    }
}

/// Where the conversation currently is.
///
/// One variant per protocol step, so a session cannot be both confirming an
/// order and waiting for an SMS code.
#[derive(Debug, Clone, Default)]
pub enum DialogState {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// Waiting for "name + phone number" of a new account.
    AddingAccount,
    /// Waiting for the user to pick an account by name.
    AwaitingAuth,
    /// An SMS code was sent to `phone`; waiting for the user to read it out.
    AwaitingSms { name: String, phone: PhoneNumber },
    /// Authenticated; building the cart.
    Browsing { user: AuthorizedUser },
    /// Cart is done; waiting for "yes" to price it.
    ConfirmingOrder { user: AuthorizedUser },
    /// Order is priced at `total`; waiting for "yes" to pay.
    AwaitingPayment { user: AuthorizedUser, total: Price },
    /// Payment went through; only a farewell remains.
    Ended,
}

impl DialogState {
    /// Short label for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AddingAccount => "adding_account",
            Self::AwaitingAuth => "awaiting_auth",
            Self::AwaitingSms { .. } => "awaiting_sms",
            Self::Browsing { .. } => "browsing",
            Self::ConfirmingOrder { .. } => "confirming_order",
            Self::AwaitingPayment { .. } => "awaiting_payment",
            Self::Ended => "ended",
        }
    }

    /// The authorized user, in any post-authentication state.
    #[must_use]
    pub const fn user(&self) -> Option<&AuthorizedUser> {
        match self {
            Self::Browsing { user }
            | Self::ConfirmingOrder { user }
            | Self::AwaitingPayment { user, .. } => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

/// Everything the skill remembers about one conversation partner.
#[derive(Debug, Default)]
pub struct Session {
    pub state: DialogState,
    /// Purchase correlation handle sent with every commerce call.
    pub workflow: Option<WorkflowHandle>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
