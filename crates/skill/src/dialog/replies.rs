//! Reply texts read out to the user.

use std::fmt::Write as _;

use alice_grocer_core::Price;

use crate::commerce::DeliverySummary;

/// A product announced by the "new items" command.
pub struct CatalogItem {
    pub name: &'static str,
    pub description: &'static str,
}

/// New arrivals; not fetched from the platform.
pub const NEW_ARRIVALS: &[CatalogItem] = &[
    CatalogItem {
        name: "яблоки",
        description: "сочный плод яблони, который употребляется в пищу в свежем и запечённом виде",
    },
    CatalogItem {
        name: "груши",
        description: "род плодовых и декоративных деревьев и кустарников семейства розовые",
    },
];

// Authentication
pub const ADD_ACCOUNT_PROMPT: &str =
    "Пожалуйста, добавьте пользователя: скажите имя и номер телефона.";
pub const ADD_ACCOUNT_RETRY: &str = "Ошибка добавления пользователя. Пожалуйста, повторите.";
pub const AUTH_SUCCESS: &str =
    "Авторизация успешна. Теперь вы можете запросить новинки или добавить продукты в корзину.";
pub const INVALID_CODE: &str = "Неверный код. Попробуйте снова.";
pub const VERIFY_FAILED: &str = "Не удалось проверить код. Попробуйте снова.";
pub const ACCOUNT_NOT_FOUND: &str =
    "Такого пользователя не существует, пожалуйста, повторите! Или добавьте нового.";

// Shopping
pub const CART_EMPTY: &str = "Ваша корзина пуста.";
pub const CART_EMPTY_ON_FINISH: &str =
    "Ваша корзина пока пуста. Скажите «добавь» и название списка, чтобы добавить продукты.";
pub const CART_UNAVAILABLE: &str = "Не удалось получить корзину. Попробуйте позже.";
pub const PRODUCT_NOT_FOUND: &str = "Продукт не найден. Пожалуйста, попробуйте снова.";
pub const STOCK_UNKNOWN: &str =
    "Не удалось проверить наличие товаров, поэтому я не стала их добавлять. Попробуйте позже.";
pub const ADD_FAILED: &str = "Не удалось добавить товары в корзину. Попробуйте снова.";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Вы можете запросить новинки или добавить продукты в корзину. Для этого скажите «добавь» перед названием списка.";

// Checkout
pub const NO_PAYMENT_METHOD: &str = "Скорее всего, у вас нет выбранной карты в приложении. Пожалуйста, подключите способ оплаты.";
pub const SERVICE_UNAVAILABLE: &str = "Сервис временно недоступен. Попробуйте позже.";
pub const PRICE_ERROR: &str = "Не удалось рассчитать стоимость заказа. Попробуйте ещё раз.";
pub const ORDER_CANCELLED: &str = "Заказ отменён.";
pub const ORDER_REPROMPT: &str = "Извините, я вас не поняла. Хотите оформить заказ?";
pub const PAYMENT_REPROMPT: &str = "Извините, я вас не поняла. Хотите оплатить заказ?";
pub const PAYMENT_FAILED: &str = "Извините, что-то пошло не так. Попробуйте ещё раз.";
pub const ORDER_PAID: &str = "Заказ оплачен. Спасибо!";

pub const FAREWELL: &str = "Всего доброго!";

pub fn choose_account<'a>(names: impl Iterator<Item = &'a str>) -> String {
    format!(
        "Пожалуйста, выберите пользователя из существующих: {}. Или добавьте нового, сказав «новый пользователь».",
        names.collect::<Vec<_>>().join(", ")
    )
}

pub fn account_added(name: &str) -> String {
    format!("Пользователь {name} добавлен. Выберите пользователя, сказав его имя.")
}

pub fn sms_sent(name: &str) -> String {
    format!("Для пользователя {name} отправлено SMS. Скажите код.")
}

pub fn new_arrivals() -> String {
    let mut text = String::from("Вот новинки: ");
    for (i, item) in NEW_ARRIVALS.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        let _ = write!(text, "{}: {}", item.name, item.description);
    }
    text.push('.');
    text
}

pub fn cart_contents(items: &[String]) -> String {
    format!("В вашем заказе: {}.", items.join(", "))
}

pub fn confirm_order(items: &[String]) -> String {
    format!("Хотите оформить заказ на {}?", items.join(", "))
}

pub fn added_to_cart(title: &str) -> String {
    format!("{title} добавлен в корзину. Что-нибудь ещё?")
}

pub fn out_of_stock(names: &[String]) -> String {
    format!(
        "Извините, но сейчас товаров {} нет на складе. Может быть, вы хотели бы заказать что-нибудь ещё?",
        names.join(", ")
    )
}

pub fn pay_prompt(total: &Price) -> String {
    format!("Оплатить заказ на сумму {total}?")
}

pub fn delivery(summary: &DeliverySummary) -> String {
    format!(
        "Ваш заказ на сумму {} по адресу {} прибудет {} с {} до {}.",
        summary.total,
        summary.address,
        summary.window_start.format("%d.%m"),
        summary.window_start.format("%H:%M"),
        summary.window_end.format("%H:%M"),
    )
}
