//! Domain types returned by the commerce platform.

use alice_grocer_core::{ListId, PaymentCardId, Price, TimeslotId, WorkflowHandle};
use chrono::{DateTime, FixedOffset};

/// A saved shopping list; adding one to the cart adds all its products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    pub id: ListId,
    pub title: String,
}

/// Stock count of one product on a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub name: String,
    pub stock_count: i64,
}

impl StockLevel {
    /// At least one unit can be delivered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock_count >= 1
    }
}

/// Delivery slot and card chosen for checkout pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSelection {
    pub timeslot: TimeslotId,
    pub card: PaymentCardId,
}

/// What the user is told after a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySummary {
    pub total: Price,
    pub address: String,
    pub window_start: DateTime<FixedOffset>,
    pub window_end: DateTime<FixedOffset>,
}

/// Result of capturing a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    /// Handle for the next purchase attempt.
    pub workflow: WorkflowHandle,
    pub delivery: Option<DeliverySummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_level_availability() {
        let level = |stock_count| StockLevel {
            name: "молоко".to_string(),
            stock_count,
        };
        assert!(level(1).is_available());
        assert!(level(12).is_available());
        assert!(!level(0).is_available());
        assert!(!level(-3).is_available());
    }
}
