//! Grocery commerce platform API.
//!
//! # Architecture
//!
//! - [`CommerceApi`] is the seam the dialog engine talks to; every capability
//!   is one request with no retry
//! - [`CommerceClient`] implements it over REST with `reqwest`
//! - Every call returns `Result<Option<T>, CommerceError>`: `Ok(None)` means
//!   the platform legitimately has nothing (no current card, rejected code),
//!   `Err` means the call itself failed
//!
//! # Conventions
//!
//! - Authenticated calls carry `Authorization: JWT <access token>`
//! - Calls that belong to a purchase attempt carry a `workflow` header
//! - Responses are wrapped in a `{"data": ...}` envelope

mod client;
pub mod types;
mod wire;

pub use client::CommerceClient;
pub use types::*;

use alice_grocer_core::{
    ListId, OrderId, PaymentCardId, PhoneNumber, Price, TimeslotId, TokenPair, WorkflowHandle,
};
use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur when calling the commerce platform.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A token or workflow handle cannot be sent as a header.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Endpoint URL could not be built from the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Remote capabilities the dialog engine depends on.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Send an SMS with a one-time code to `phone`.
    async fn send_sms_code(
        &self,
        phone: &PhoneNumber,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<(), CommerceError>;

    /// Exchange an SMS code for a token pair. `Ok(None)` means the code was rejected.
    async fn verify_sms_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<TokenPair>, CommerceError>;

    /// Obtain a new access token from a stored pair. `Ok(None)` means the pair is no longer valid.
    async fn refresh_token(&self, tokens: &TokenPair) -> Result<Option<String>, CommerceError>;

    /// The user's shopping lists, in platform order.
    async fn shopping_lists(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Vec<ShoppingList>, CommerceError>;

    /// Stock counts of every product on a shopping list. `Ok(None)` means the platform had no answer.
    async fn stock_levels(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        list: ListId,
    ) -> Result<Option<Vec<StockLevel>>, CommerceError>;

    /// Put every product of a shopping list into the cart.
    async fn add_list_to_cart(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        list: ListId,
    ) -> Result<(), CommerceError>;

    /// Names of the products currently in the cart.
    async fn cart_items(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Vec<String>, CommerceError>;

    /// The card marked as current in the user's profile.
    async fn current_payment_card(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<PaymentCardId>, CommerceError>;

    /// The nearest delivery timeslot with free capacity.
    async fn closest_timeslot(
        &self,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<TimeslotId>, CommerceError>;

    /// Price the cart for delivery in `selection.timeslot`, paid with `selection.card`.
    async fn checkout(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        selection: CheckoutSelection,
    ) -> Result<Option<Price>, CommerceError>;

    /// Turn the priced cart into an order.
    async fn create_order(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<OrderId>, CommerceError>;

    /// Start payment of the order; returns the order-scoped payment token.
    async fn apply_payment(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<String>, CommerceError>;

    /// Capture the payment; returns the delivery summary and the next workflow handle.
    async fn confirm_payment(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<PaymentConfirmation>, CommerceError>;
}
