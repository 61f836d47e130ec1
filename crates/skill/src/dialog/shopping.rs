//! Commands available once the user is signed in.

use tracing::{info, warn};

use super::intent::{Intent, Stage};
use super::replies;
use super::state::{AuthorizedUser, DialogState, Session};
use super::Dialog;

impl Dialog {
    pub(super) async fn shop(&self, session: &mut Session, utterance: &str) -> String {
        let Some(user) = session.state.user().cloned() else {
            return replies::UNKNOWN_COMMAND.to_string();
        };

        match self.classify(utterance, Stage::Shopping) {
            Intent::Browse => replies::new_arrivals(),
            Intent::ShowCart => self.show_cart(session, &user).await,
            Intent::Finish => self.finish(session, user).await,
            Intent::AddItem(text) => self.add_item(session, &user, &text).await,
            _ => replies::UNKNOWN_COMMAND.to_string(),
        }
    }

    async fn show_cart(&self, session: &Session, user: &AuthorizedUser) -> String {
        match self
            .commerce
            .cart_items(&user.token, session.workflow.as_ref())
            .await
        {
            Ok(items) if items.is_empty() => replies::CART_EMPTY.to_string(),
            Ok(items) => replies::cart_contents(&items),
            Err(e) => {
                warn!(error = %e, "Failed to fetch cart");
                replies::CART_UNAVAILABLE.to_string()
            }
        }
    }

    async fn finish(&self, session: &mut Session, user: AuthorizedUser) -> String {
        match self
            .commerce
            .cart_items(&user.token, session.workflow.as_ref())
            .await
        {
            Ok(items) if items.is_empty() => replies::CART_EMPTY_ON_FINISH.to_string(),
            Ok(items) => {
                session.state = DialogState::ConfirmingOrder { user };
                replies::confirm_order(&items)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch cart");
                replies::CART_UNAVAILABLE.to_string()
            }
        }
    }

    /// Add the first shopping list whose title the user mentioned, if all of it is in stock.
    ///
    /// Anything short of a non-empty stock report refuses the add.
    async fn add_item(&self, session: &Session, user: &AuthorizedUser, text: &str) -> String {
        let workflow = session.workflow.as_ref();

        let lists = match self.commerce.shopping_lists(&user.token, workflow).await {
            Ok(lists) => lists,
            Err(e) => {
                warn!(error = %e, "Failed to fetch shopping lists");
                return replies::SERVICE_UNAVAILABLE.to_string();
            }
        };

        let Some(list) = lists
            .into_iter()
            .find(|list| !list.title.is_empty() && text.contains(&list.title.to_lowercase()))
        else {
            return replies::PRODUCT_NOT_FOUND.to_string();
        };

        let levels = match self
            .commerce
            .stock_levels(&user.token, workflow, list.id)
            .await
        {
            Ok(Some(levels)) if !levels.is_empty() => levels,
            Ok(_) => {
                warn!(list = %list.id, "Stock check returned no products");
                return replies::STOCK_UNKNOWN.to_string();
            }
            Err(e) => {
                warn!(error = %e, list = %list.id, "Stock check failed");
                return replies::STOCK_UNKNOWN.to_string();
            }
        };

        let missing: Vec<String> = levels
            .into_iter()
            .filter(|level| !level.is_available())
            .map(|level| level.name)
            .collect();
        if !missing.is_empty() {
            return replies::out_of_stock(&missing);
        }

        match self
            .commerce
            .add_list_to_cart(&user.token, workflow, list.id)
            .await
        {
            Ok(()) => {
                info!(list = %list.id, "Added shopping list to cart");
                replies::added_to_cart(&list.title)
            }
            Err(e) => {
                warn!(error = %e, list = %list.id, "Failed to add list to cart");
                replies::ADD_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use alice_grocer_core::{AccountStore, ListId};

    use super::*;
    use crate::commerce::{ShoppingList, StockLevel};
    use crate::dialog::fake::{FakeCommerce, Stub, dialog, masha, session_in};

    fn browsing() -> Session {
        session_in(DialogState::Browsing { user: masha() })
    }

    async fn turn(fake: &Arc<FakeCommerce>, session: &mut Session, utterance: &str) -> String {
        let mut accounts = AccountStore::new();
        let reply = dialog(fake)
            .respond(session, utterance, &mut accounts)
            .await;
        assert!(accounts.is_empty());
        reply.text
    }

    #[tokio::test]
    async fn test_new_arrivals_make_no_calls() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = browsing();

        let text = turn(&fake, &mut session, "Расскажи про новинки").await;

        assert_eq!(text, replies::new_arrivals());
        assert!(fake.calls().is_empty());
        assert!(matches!(session.state, DialogState::Browsing { .. }));
        assert_eq!(session.workflow.as_ref().map(|w| w.as_str()), Some("wf-1"));
    }

    #[tokio::test]
    async fn test_show_cart() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = browsing();

        let text = turn(&fake, &mut session, "что в моём заказе").await;

        assert_eq!(
            text,
            replies::cart_contents(&["молоко 3,2%".to_string(), "хлеб".to_string()])
        );
        let call = &fake.calls()[0];
        assert_eq!(call.token.as_deref(), Some("access-1"));
        assert_eq!(call.workflow.as_deref(), Some("wf-1"));
    }

    #[tokio::test]
    async fn test_show_cart_empty_and_failed_differ() {
        let fake = Arc::new(FakeCommerce {
            cart: Stub::Value(Vec::new()),
            ..FakeCommerce::default()
        });
        let mut session = browsing();
        assert_eq!(
            turn(&fake, &mut session, "заказ").await,
            replies::CART_EMPTY
        );

        let fake = Arc::new(FakeCommerce {
            cart: Stub::Fail,
            ..FakeCommerce::default()
        });
        assert_eq!(
            turn(&fake, &mut session, "заказ").await,
            replies::CART_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_finish_moves_to_confirmation() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = browsing();

        let text = turn(&fake, &mut session, "достаточно").await;

        assert!(text.starts_with("Хотите оформить заказ на"));
        assert!(matches!(session.state, DialogState::ConfirmingOrder { .. }));
    }

    #[tokio::test]
    async fn test_finish_with_empty_cart_stays() {
        let fake = Arc::new(FakeCommerce {
            cart: Stub::Value(Vec::new()),
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "нет").await;

        assert_eq!(text, replies::CART_EMPTY_ON_FINISH);
        assert!(matches!(session.state, DialogState::Browsing { .. }));
    }

    #[tokio::test]
    async fn test_finish_with_failed_cart_stays() {
        let fake = Arc::new(FakeCommerce {
            cart: Stub::Fail,
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "всё").await;

        assert_eq!(text, replies::CART_UNAVAILABLE);
        assert!(matches!(session.state, DialogState::Browsing { .. }));
    }

    #[tokio::test]
    async fn test_add_item_in_stock() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = browsing();

        let text = turn(&fake, &mut session, "Добавь молоко").await;

        assert_eq!(text, replies::added_to_cart("Молоко"));
        assert_eq!(
            fake.call_names(),
            vec!["shopping_lists", "stock_levels", "add_list_to_cart"]
        );
    }

    #[tokio::test]
    async fn test_add_item_picks_first_matching_list() {
        let fake = Arc::new(FakeCommerce {
            lists: Stub::Value(vec![
                ShoppingList {
                    id: ListId::new(1),
                    title: "Сыр".to_string(),
                },
                ShoppingList {
                    id: ListId::new(2),
                    title: "Сыр твёрдый".to_string(),
                },
            ]),
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "закажи сыр твёрдый").await;

        assert_eq!(text, replies::added_to_cart("Сыр"));
    }

    #[tokio::test]
    async fn test_add_item_out_of_stock_does_not_touch_cart() {
        let fake = Arc::new(FakeCommerce {
            stock: Stub::Value(Some(vec![
                StockLevel {
                    name: "молоко".to_string(),
                    stock_count: 0,
                },
                StockLevel {
                    name: "кефир".to_string(),
                    stock_count: 2,
                },
            ])),
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "добавь молоко").await;

        assert_eq!(text, replies::out_of_stock(&["молоко".to_string()]));
        assert!(!fake.called("add_list_to_cart"));
    }

    #[tokio::test]
    async fn test_add_item_stock_check_failure_refuses() {
        let fake = Arc::new(FakeCommerce {
            stock: Stub::Fail,
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "добавь молоко").await;

        assert_eq!(text, replies::STOCK_UNKNOWN);
        assert!(!fake.called("add_list_to_cart"));
    }

    #[tokio::test]
    async fn test_add_item_without_stock_report_refuses() {
        for stock in [None, Some(Vec::new())] {
            let fake = Arc::new(FakeCommerce {
                stock: Stub::Value(stock),
                ..FakeCommerce::default()
            });
            let mut session = browsing();

            let text = turn(&fake, &mut session, "добавь молоко").await;

            assert_eq!(text, replies::STOCK_UNKNOWN);
            assert_eq!(fake.call_names(), vec!["shopping_lists", "stock_levels"]);
        }
    }

    #[tokio::test]
    async fn test_add_item_add_failure() {
        let fake = Arc::new(FakeCommerce {
            add_to_cart: Stub::Fail,
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "добавь молоко").await;

        assert_eq!(text, replies::ADD_FAILED);
    }

    #[tokio::test]
    async fn test_add_item_unknown_product() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = browsing();

        let text = turn(&fake, &mut session, "добавь ананас").await;

        assert_eq!(text, replies::PRODUCT_NOT_FOUND);
        assert_eq!(fake.call_names(), vec!["shopping_lists"]);
    }

    #[tokio::test]
    async fn test_add_item_lists_unavailable() {
        let fake = Arc::new(FakeCommerce {
            lists: Stub::Fail,
            ..FakeCommerce::default()
        });
        let mut session = browsing();

        let text = turn(&fake, &mut session, "добавь молоко").await;

        assert_eq!(text, replies::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let fake = Arc::new(FakeCommerce::default());
        let mut session = browsing();

        let text = turn(&fake, &mut session, "спой песню").await;

        assert_eq!(text, replies::UNKNOWN_COMMAND);
        assert!(fake.calls().is_empty());
    }
}
