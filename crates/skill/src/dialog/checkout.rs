//! Order and payment confirmation.

use tracing::{info, warn};

use super::intent::{Intent, Stage};
use super::replies;
use super::state::{DialogState, Session};
use super::Dialog;
use crate::commerce::CheckoutSelection;

impl Dialog {
    pub(super) async fn confirm_order(&self, session: &mut Session, utterance: &str) -> String {
        let Some(user) = session.state.user().cloned() else {
            return replies::ORDER_REPROMPT.to_string();
        };

        match self.classify(utterance, Stage::Confirmation) {
            Intent::Confirm => {}
            Intent::Deny => {
                session.state = DialogState::Browsing { user };
                return replies::ORDER_CANCELLED.to_string();
            }
            _ => return replies::ORDER_REPROMPT.to_string(),
        }

        let workflow = session.workflow.as_ref();
        let (card, timeslot) = tokio::join!(
            self.commerce.current_payment_card(&user.token, workflow),
            self.commerce.closest_timeslot(workflow),
        );

        let selection = match (card, timeslot) {
            (Ok(Some(card)), Ok(Some(timeslot))) => CheckoutSelection { timeslot, card },
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to fetch payment card or timeslot");
                return replies::SERVICE_UNAVAILABLE.to_string();
            }
            _ => return replies::NO_PAYMENT_METHOD.to_string(),
        };

        match self.commerce.checkout(&user.token, workflow, selection).await {
            Ok(Some(total)) => {
                let reply = replies::pay_prompt(&total);
                session.state = DialogState::AwaitingPayment { user, total };
                reply
            }
            Ok(None) => replies::PRICE_ERROR.to_string(),
            Err(e) => {
                warn!(error = %e, "Checkout pricing failed");
                replies::PRICE_ERROR.to_string()
            }
        }
    }

    pub(super) async fn confirm_payment(&self, session: &mut Session, utterance: &str) -> String {
        let Some(user) = session.state.user().cloned() else {
            return replies::PAYMENT_REPROMPT.to_string();
        };

        match self.classify(utterance, Stage::Confirmation) {
            Intent::Confirm => {}
            Intent::Deny => {
                session.state = DialogState::Browsing { user };
                return replies::ORDER_CANCELLED.to_string();
            }
            _ => return replies::PAYMENT_REPROMPT.to_string(),
        }

        let workflow = session.workflow.as_ref();

        let order = match self.commerce.create_order(&user.token, workflow).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!("Order creation returned no order");
                return replies::PAYMENT_FAILED.to_string();
            }
            Err(e) => {
                warn!(error = %e, "Order creation failed");
                return replies::PAYMENT_FAILED.to_string();
            }
        };

        match self.commerce.apply_payment(&user.token, workflow).await {
            Ok(Some(_order_token)) => {}
            Ok(None) => {
                warn!(order = %order, "Payment apply returned no order token");
                return replies::PAYMENT_FAILED.to_string();
            }
            Err(e) => {
                warn!(error = %e, order = %order, "Payment apply failed");
                return replies::PAYMENT_FAILED.to_string();
            }
        }

        let confirmation = match self.commerce.confirm_payment(&user.token, workflow).await {
            Ok(Some(confirmation)) => confirmation,
            Ok(None) => {
                warn!(order = %order, "Payment confirmation returned nothing");
                return replies::PAYMENT_FAILED.to_string();
            }
            Err(e) => {
                warn!(error = %e, order = %order, "Payment confirmation failed");
                return replies::PAYMENT_FAILED.to_string();
            }
        };

        info!(order = %order, "Order paid");

        session.workflow = Some(confirmation.workflow);
        session.state = DialogState::Ended;
        confirmation
            .delivery
            .as_ref()
            .map_or_else(|| replies::ORDER_PAID.to_string(), replies::delivery)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use alice_grocer_core::{AccountStore, Price};
    use rust_decimal::Decimal;

    use super::*;
    use crate::dialog::Reply;
    use crate::dialog::fake::{FakeCommerce, Stub, dialog, masha, session_in};

    fn confirming() -> Session {
        session_in(DialogState::ConfirmingOrder { user: masha() })
    }

    fn paying() -> Session {
        session_in(DialogState::AwaitingPayment {
            user: masha(),
            total: Price::rub(Decimal::new(1500, 0)),
        })
    }

    async fn turn(fake: &Arc<FakeCommerce>, session: &mut Session, utterance: &str) -> Reply {
        dialog(fake)
            .respond(session, utterance, &mut AccountStore::new())
            .await
    }

    #[tokio::test]
    async fn test_confirm_order_prices_cart() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = confirming();

        let reply = turn(&fake, &mut session, "да").await;

        assert_eq!(reply.text, "Оплатить заказ на сумму 1500.00 ₽?");
        assert!(!reply.end_session);
        assert!(matches!(
            session.state,
            DialogState::AwaitingPayment { total, .. } if total == Price::rub(Decimal::new(1500, 0))
        ));
        let names = fake.call_names();
        assert!(names.contains(&"current_payment_card"));
        assert!(names.contains(&"closest_timeslot"));
        assert_eq!(names.last(), Some(&"checkout"));
    }

    #[tokio::test]
    async fn test_missing_card_skips_checkout() {
        let fake = Arc::new(FakeCommerce {
            card: Stub::Value(None),
            ..FakeCommerce::default()
        });
        let mut session = confirming();

        let reply = turn(&fake, &mut session, "да").await;

        assert_eq!(reply.text, replies::NO_PAYMENT_METHOD);
        assert!(!fake.called("checkout"));
        assert!(matches!(session.state, DialogState::ConfirmingOrder { .. }));
    }

    #[tokio::test]
    async fn test_missing_timeslot_skips_checkout() {
        let fake = Arc::new(FakeCommerce {
            timeslot: Stub::Value(None),
            ..FakeCommerce::default()
        });
        let mut session = confirming();

        let reply = turn(&fake, &mut session, "да").await;

        assert_eq!(reply.text, replies::NO_PAYMENT_METHOD);
        assert!(!fake.called("checkout"));
    }

    #[tokio::test]
    async fn test_failed_lookup_reports_unavailable() {
        let fake = Arc::new(FakeCommerce {
            timeslot: Stub::Fail,
            ..FakeCommerce::default()
        });
        let mut session = confirming();

        let reply = turn(&fake, &mut session, "да").await;

        assert_eq!(reply.text, replies::SERVICE_UNAVAILABLE);
        assert!(!fake.called("checkout"));
        assert!(matches!(session.state, DialogState::ConfirmingOrder { .. }));
    }

    #[tokio::test]
    async fn test_price_error_stays() {
        for total in [Stub::Value(None), Stub::Fail] {
            let fake = Arc::new(FakeCommerce {
                total,
                ..FakeCommerce::default()
            });
            let mut session = confirming();

            let reply = turn(&fake, &mut session, "да").await;

            assert_eq!(reply.text, replies::PRICE_ERROR);
            assert!(matches!(session.state, DialogState::ConfirmingOrder { .. }));
        }
    }

    #[tokio::test]
    async fn test_deny_order_returns_to_browsing() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = confirming();

        let reply = turn(&fake, &mut session, "нет").await;

        assert_eq!(reply.text, replies::ORDER_CANCELLED);
        assert!(matches!(session.state, DialogState::Browsing { .. }));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unclear_order_answer_reprompts() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = confirming();

        let reply = turn(&fake, &mut session, "подумаю").await;

        assert_eq!(reply.text, replies::ORDER_REPROMPT);
        assert!(matches!(session.state, DialogState::ConfirmingOrder { .. }));
    }

    #[tokio::test]
    async fn test_payment_success_ends_session() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = paying();

        let reply = turn(&fake, &mut session, "да").await;

        assert!(reply.end_session);
        assert!(reply.text.contains("1500.00 ₽"));
        assert!(reply.text.contains("ул. Ленина, 1"));
        assert!(session.state.is_ended());
        assert_eq!(session.workflow.as_ref().map(|w| w.as_str()), Some("wf-next"));
        assert_eq!(
            fake.call_names(),
            vec!["create_order", "apply_payment", "confirm_payment"]
        );
        assert!(
            fake.calls()
                .iter()
                .all(|c| c.workflow.as_deref() == Some("wf-1"))
        );
    }

    #[tokio::test]
    async fn test_payment_without_delivery_info() {
        let fake = Arc::new(FakeCommerce {
            confirmation: Stub::Value(Some(crate::commerce::PaymentConfirmation {
                workflow: alice_grocer_core::WorkflowHandle::new("wf-next"),
                delivery: None,
            })),
            ..FakeCommerce::default()
        });
        let mut session = paying();

        let reply = turn(&fake, &mut session, "да").await;

        assert_eq!(reply.text, replies::ORDER_PAID);
        assert!(reply.end_session);
    }

    #[tokio::test]
    async fn test_payment_failure_at_any_step_keeps_state() {
        let variants = [
            FakeCommerce {
                order: Stub::Value(None),
                ..FakeCommerce::default()
            },
            FakeCommerce {
                order: Stub::Fail,
                ..FakeCommerce::default()
            },
            FakeCommerce {
                order_token: Stub::Value(None),
                ..FakeCommerce::default()
            },
            FakeCommerce {
                order_token: Stub::Fail,
                ..FakeCommerce::default()
            },
            FakeCommerce {
                confirmation: Stub::Value(None),
                ..FakeCommerce::default()
            },
            FakeCommerce {
                confirmation: Stub::Fail,
                ..FakeCommerce::default()
            },
        ];

        for fake in variants {
            let fake = Arc::new(fake);
            let mut session = paying();

            let reply = turn(&fake, &mut session, "да").await;

            assert_eq!(reply.text, replies::PAYMENT_FAILED);
            assert!(!reply.end_session);
            assert!(matches!(session.state, DialogState::AwaitingPayment { .. }));
            assert_eq!(session.workflow.as_ref().map(|w| w.as_str()), Some("wf-1"));
        }
    }

    #[tokio::test]
    async fn test_deny_payment_returns_to_browsing() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = paying();

        let reply = turn(&fake, &mut session, "нет, не надо").await;

        assert_eq!(reply.text, replies::ORDER_CANCELLED);
        assert!(matches!(session.state, DialogState::Browsing { .. }));
    }

    #[tokio::test]
    async fn test_unclear_payment_answer_reprompts() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = paying();

        let reply = turn(&fake, &mut session, "хм").await;

        assert_eq!(reply.text, replies::PAYMENT_REPROMPT);
        assert!(fake.calls().is_empty());
    }
}
