//! What the user meant by an utterance.

/// Interpreted meaning of one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Register another phone-linked account.
    AddAccount,
    /// Pick an account by display name (trimmed, case preserved).
    SelectUser(String),
    /// Read out the SMS code.
    SubmitCode(String),
    /// Hear about new products.
    Browse,
    /// Hear what is in the cart.
    ShowCart,
    /// Nothing more to add; move to checkout.
    Finish,
    /// Add a shopping list; carries the lowercased utterance to match titles against.
    AddItem(String),
    Confirm,
    Deny,
    Unknown,
}

/// Which vocabulary applies, given where the conversation is.
///
/// The same word means different things in different steps: "нет" finishes
/// the cart while browsing but cancels the order during confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Entering a new account's name and phone number.
    Enrollment,
    /// Choosing an account.
    SignIn,
    /// Waiting for an SMS code.
    CodeEntry,
    /// Authenticated and shopping.
    Shopping,
    /// Answering a yes/no question about the order or payment.
    Confirmation,
}

/// Maps utterances to intents.
pub trait IntentClassifier: Send + Sync {
    /// Classify a trimmed utterance.
    fn classify(&self, utterance: &str, stage: Stage) -> Intent;
}
