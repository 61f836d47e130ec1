//! JSON bodies exchanged with the commerce API and their conversions.

use std::str::FromStr;

use alice_grocer_core::{
    ListId, OrderId, PaymentCardId, Price, TimeslotId, TokenPair, WorkflowHandle,
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::types::{
    CheckoutSelection, DeliverySummary, PaymentConfirmation, ShoppingList, StockLevel,
};

/// Every response is wrapped in `{"data": ...}`; `null` or missing data is an absence.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub data: Option<T>,
}

/// Paginated collections carry their items in `results`.
#[derive(Debug, Deserialize)]
pub(super) struct Results<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
pub(super) struct SmsChallengeBody<'a> {
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct SmsVerifyBody<'a> {
    pub phone: &'a str,
    pub code: &'a str,
}

#[derive(Deserialize)]
pub(super) struct TokenPairData {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPairData> for TokenPair {
    fn from(data: TokenPairData) -> Self {
        Self::new(data.access, data.refresh)
    }
}

#[derive(Serialize)]
pub(super) struct RefreshBody<'a> {
    pub token: &'a str,
    pub refresh: &'a str,
}

#[derive(Deserialize)]
pub(super) struct AccessTokenData {
    pub access: String,
}

// =============================================================================
// Lists and cart
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct ShoppingListData {
    pub id: ListId,
    pub title: String,
}

impl From<ShoppingListData> for ShoppingList {
    fn from(data: ShoppingListData) -> Self {
        Self {
            id: data.id,
            title: data.title,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StockLevelData {
    pub name: String,
    #[serde(default)]
    pub stock_count: i64,
}

impl From<StockLevelData> for StockLevel {
    fn from(data: StockLevelData) -> Self {
        Self {
            name: data.name,
            stock_count: data.stock_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CartData {
    #[serde(default = "Vec::new")]
    pub items: Vec<CartItemData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CartItemData {
    pub name: String,
}

// =============================================================================
// Checkout and payment
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct PaymentCardData {
    pub id: PaymentCardId,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct TimeslotData {
    pub id: TimeslotId,
}

#[derive(Debug, Serialize)]
pub(super) struct IdRef<T> {
    pub id: T,
}

#[derive(Debug, Serialize)]
pub(super) struct DeliveryChoice {
    pub express_selected: bool,
    pub timeslot: IdRef<TimeslotId>,
}

#[derive(Debug, Serialize)]
pub(super) struct CheckoutBody {
    pub delivery: DeliveryChoice,
    pub payment_method: &'static str,
    pub payment_card: IdRef<PaymentCardId>,
}

impl From<CheckoutSelection> for CheckoutBody {
    fn from(selection: CheckoutSelection) -> Self {
        Self {
            delivery: DeliveryChoice {
                express_selected: false,
                timeslot: IdRef {
                    id: selection.timeslot,
                },
            },
            payment_method: "CARD",
            payment_card: IdRef { id: selection.card },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutData {
    #[serde(default, deserialize_with = "decimal_opt")]
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderData {
    pub id: OrderId,
}

#[derive(Debug, Deserialize)]
pub(super) struct PaymentApplyData {
    pub order_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PaymentConfirmData {
    pub workflow_uuid: String,
    #[serde(default)]
    pub delivery_info: Option<DeliveryInfoData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeliveryInfoData {
    #[serde(deserialize_with = "decimal")]
    pub total_amount: Decimal,
    pub address: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

impl From<PaymentConfirmData> for PaymentConfirmation {
    fn from(data: PaymentConfirmData) -> Self {
        Self {
            workflow: WorkflowHandle::new(data.workflow_uuid),
            delivery: data.delivery_info.map(|info| DeliverySummary {
                total: Price::rub(info.total_amount),
                address: info.address,
                window_start: info.start_time,
                window_end: info.end_time,
            }),
        }
    }
}

// =============================================================================
// Amounts
// =============================================================================

/// Amounts arrive as JSON numbers or as strings depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    fn into_decimal<E: serde::de::Error>(self) -> Result<Decimal, E> {
        let text = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        };
        let text = text.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|e| E::custom(format!("invalid amount {text:?}: {e}")))
    }
}

fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    RawAmount::deserialize(deserializer)?.into_decimal()
}

fn decimal_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    Option::<RawAmount>::deserialize(deserializer)?
        .map(RawAmount::into_decimal)
        .transpose()
}
