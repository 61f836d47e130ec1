//! Recording in-memory commerce platform for dialog tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use alice_grocer_core::{
    AccountStore, ListId, OrderId, PaymentCardId, PhoneNumber, Price, TimeslotId, TokenPair,
    WorkflowHandle,
};
use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use super::{AuthorizedUser, Dialog, DialogState, Session};
use crate::commerce::{
    CheckoutSelection, CommerceApi, CommerceError, DeliverySummary, PaymentConfirmation,
    ShoppingList, StockLevel,
};

/// Canned outcome of one capability.
#[derive(Debug, Clone)]
pub enum Stub<T> {
    Value(T),
    Fail,
}

impl<T: Clone> Stub<T> {
    fn get(&self) -> Result<T, CommerceError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Fail => Err(CommerceError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }),
        }
    }
}

/// A recorded call: capability name plus the workflow header it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: &'static str,
    pub workflow: Option<String>,
    pub token: Option<String>,
}

pub struct FakeCommerce {
    pub sms: Stub<()>,
    pub verify: Stub<Option<TokenPair>>,
    pub refresh: Stub<Option<String>>,
    pub lists: Stub<Vec<ShoppingList>>,
    pub stock: Stub<Option<Vec<StockLevel>>>,
    pub add_to_cart: Stub<()>,
    pub cart: Stub<Vec<String>>,
    pub card: Stub<Option<PaymentCardId>>,
    pub timeslot: Stub<Option<TimeslotId>>,
    pub total: Stub<Option<Price>>,
    pub order: Stub<Option<OrderId>>,
    pub order_token: Stub<Option<String>>,
    pub confirmation: Stub<Option<PaymentConfirmation>>,
    pub log: Mutex<Vec<Call>>,
}

impl Default for FakeCommerce {
    fn default() -> Self {
        Self {
            sms: Stub::Value(()),
            verify: Stub::Value(Some(TokenPair::new("access-sms", "refresh-sms"))),
            refresh: Stub::Value(Some("access-refreshed".to_string())),
            lists: Stub::Value(vec![
                ShoppingList {
                    id: ListId::new(1),
                    title: "Молоко".to_string(),
                },
                ShoppingList {
                    id: ListId::new(2),
                    title: "Фрукты".to_string(),
                },
            ]),
            stock: Stub::Value(Some(vec![StockLevel {
                name: "молоко 3,2%".to_string(),
                stock_count: 5,
            }])),
            add_to_cart: Stub::Value(()),
            cart: Stub::Value(vec!["молоко 3,2%".to_string(), "хлеб".to_string()]),
            card: Stub::Value(Some(PaymentCardId::new(3))),
            timeslot: Stub::Value(Some(TimeslotId::new(7))),
            total: Stub::Value(Some(Price::rub(Decimal::new(1500, 0)))),
            order: Stub::Value(Some(OrderId::new(11))),
            order_token: Stub::Value(Some("order-token".to_string())),
            confirmation: Stub::Value(Some(PaymentConfirmation {
                workflow: WorkflowHandle::new("wf-next"),
                delivery: Some(DeliverySummary {
                    total: Price::rub(Decimal::new(1500, 0)),
                    address: "ул. Ленина, 1".to_string(),
                    window_start: DateTime::parse_from_rfc3339("2026-10-16T18:00:00+03:00")
                        .unwrap(),
                    window_end: DateTime::parse_from_rfc3339("2026-10-16T19:00:00+03:00")
                        .unwrap(),
                }),
            })),
            log: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCommerce {
    fn record(
        &self,
        name: &'static str,
        token: Option<&SecretString>,
        workflow: Option<&WorkflowHandle>,
    ) {
        self.log.lock().unwrap().push(Call {
            name,
            workflow: workflow.map(|w| w.as_str().to_string()),
            token: token.map(|t| t.expose_secret().to_string()),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    /// Capability names in call order.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.name).collect()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c.name == name)
    }
}

#[async_trait]
impl CommerceApi for FakeCommerce {
    async fn send_sms_code(
        &self,
        _phone: &PhoneNumber,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<(), CommerceError> {
        self.record("send_sms_code", None, workflow);
        self.sms.get()
    }

    async fn verify_sms_code(
        &self,
        _phone: &PhoneNumber,
        _code: &str,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<TokenPair>, CommerceError> {
        self.record("verify_sms_code", None, workflow);
        self.verify.get()
    }

    async fn refresh_token(&self, _tokens: &TokenPair) -> Result<Option<String>, CommerceError> {
        self.record("refresh_token", None, None);
        self.refresh.get()
    }

    async fn shopping_lists(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Vec<ShoppingList>, CommerceError> {
        self.record("shopping_lists", Some(token), workflow);
        self.lists.get()
    }

    async fn stock_levels(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        _list: ListId,
    ) -> Result<Option<Vec<StockLevel>>, CommerceError> {
        self.record("stock_levels", Some(token), workflow);
        self.stock.get()
    }

    async fn add_list_to_cart(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        _list: ListId,
    ) -> Result<(), CommerceError> {
        self.record("add_list_to_cart", Some(token), workflow);
        self.add_to_cart.get()
    }

    async fn cart_items(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Vec<String>, CommerceError> {
        self.record("cart_items", Some(token), workflow);
        self.cart.get()
    }

    async fn current_payment_card(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<PaymentCardId>, CommerceError> {
        self.record("current_payment_card", Some(token), workflow);
        self.card.get()
    }

    async fn closest_timeslot(
        &self,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<TimeslotId>, CommerceError> {
        self.record("closest_timeslot", None, workflow);
        self.timeslot.get()
    }

    async fn checkout(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        _selection: CheckoutSelection,
    ) -> Result<Option<Price>, CommerceError> {
        self.record("checkout", Some(token), workflow);
        self.total.get()
    }

    async fn create_order(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<OrderId>, CommerceError> {
        self.record("create_order", Some(token), workflow);
        self.order.get()
    }

    async fn apply_payment(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<String>, CommerceError> {
        self.record("apply_payment", Some(token), workflow);
        self.order_token.get()
    }

    async fn confirm_payment(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<PaymentConfirmation>, CommerceError> {
        self.record("confirm_payment", Some(token), workflow);
        self.confirmation.get()
    }
}

pub fn dialog(fake: &Arc<FakeCommerce>) -> Dialog {
    Dialog::with_keywords(Arc::clone(fake) as Arc<dyn CommerceApi>)
}

pub fn phone() -> PhoneNumber {
    PhoneNumber::parse("89990001122").unwrap()
}

pub fn masha() -> AuthorizedUser {
    AuthorizedUser::new("Маша", phone(), "access-1")
}

/// Accounts holding one unverified "Маша".
pub fn unverified_masha() -> AccountStore {
    let mut accounts = AccountStore::new();
    accounts.add_unverified("Маша", phone());
    accounts
}

/// Accounts holding "Маша" with a stored token pair.
pub fn verified_masha() -> AccountStore {
    let mut accounts = AccountStore::new();
    accounts.store_tokens("Маша", &phone(), &TokenPair::new("access-0", "refresh-0"));
    accounts
}

pub fn session_in(state: DialogState) -> Session {
    Session {
        state,
        workflow: Some(WorkflowHandle::new("wf-1")),
    }
}
