//! End-to-end harness for the Alice Grocer skill.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p alice-grocer-integration-tests
//! ```
//!
//! Everything runs in-process: [`StubCommerce`] serves the commerce REST API
//! on an ephemeral port and records every call, and [`TestSkill`] serves the
//! real skill router pointed at it. Tests talk to the skill over HTTP the way
//! the voice platform does.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use alice_grocer_skill::config::SkillConfig;
use alice_grocer_skill::routes;
use alice_grocer_skill::state::AppState;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// SMS code the stub accepts.
pub const VALID_CODE: &str = "1234";

/// Workflow handle returned by a successful payment.
const NEXT_WORKFLOW: &str = "wf-after-payment";

/// One request seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub workflow: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    calls: Mutex<Vec<RecordedCall>>,
    failing: Mutex<HashSet<String>>,
}

impl StubState {
    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_failing(&self, path: &str) -> bool {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// In-process commerce API with a fixed catalogue.
///
/// Lists: `1` "Молоко" (in stock), `2` "Фрукты" (one product sold out),
/// `3` "Хлеб" (stock check answers with no data).
/// The cart holds whatever lists were added. Checkout totals 1500 RUB.
pub struct StubCommerce {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubCommerce {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());

        let app = Router::new()
            .route("/api/auth/sms/", post(send_sms))
            .route("/api/auth/sms/verify/", post(verify_sms))
            .route("/api/auth/token/refresh/", post(refresh))
            .route("/api/lists/", get(lists))
            .route("/api/lists/{id}/products/", get(products))
            .route("/api/lists/{id}/to-cart/", post(to_cart))
            .route("/api/cart/", get(cart))
            .route("/api/users/profile/cards/", get(cards))
            .route("/api/deliveries/closest-timeslots/", get(timeslot))
            .route("/api/orders/workflow/checkout-v2/", post(checkout))
            .route("/api/orders/", post(create_order))
            .route("/api/payments/apply/", post(apply_payment))
            .route("/api/payments/confirm/", post(confirm_payment))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub commerce API");
        let addr = listener.local_addr().expect("Stub has no local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL for the skill's commerce configuration.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Stub address is a valid URL")
    }

    /// Make `path` answer 500 from now on.
    pub fn fail(&self, path: &str) {
        self.state
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string());
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls().clone()
    }

    /// Paths of every call so far, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.state.calls().iter().map(|c| c.path.clone()).collect()
    }
}

/// Record the call, then either fail it or pass it on.
async fn record(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let header_text = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let path = parts.uri.path().to_string();
    state.calls().push(RecordedCall {
        method: parts.method.to_string(),
        path: path.clone(),
        authorization: header_text(header::AUTHORIZATION.as_str()),
        workflow: header_text("workflow"),
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    });

    if state.is_failing(&path) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "stub failure").into_response();
    }

    next.run(Request::from_parts(parts, axum::body::Body::from(bytes)))
        .await
}

fn data(value: Value) -> Json<Value> {
    Json(json!({ "data": value }))
}

async fn send_sms() -> Json<Value> {
    data(Value::Null)
}

async fn verify_sms(Json(body): Json<Value>) -> Response {
    if body["code"] == VALID_CODE {
        data(json!({ "access": "access-sms", "refresh": "refresh-sms" })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": "invalid code" }))).into_response()
    }
}

async fn refresh(Json(body): Json<Value>) -> Response {
    if body["refresh"] == "refresh-sms" {
        data(json!({ "access": "access-refreshed" })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "expired" }))).into_response()
    }
}

async fn lists() -> Json<Value> {
    data(json!({
        "results": [
            { "id": 1, "title": "Молоко" },
            { "id": 2, "title": "Фрукты" },
            { "id": 3, "title": "Хлеб" }
        ]
    }))
}

async fn products(Path(id): Path<i64>) -> Response {
    match id {
        1 => data(json!({ "results": [{ "name": "Молоко 3,2%", "stock_count": 12 }] }))
            .into_response(),
        2 => data(json!({
            "results": [
                { "name": "Бананы", "stock_count": 4 },
                { "name": "Манго", "stock_count": 0 }
            ]
        }))
        .into_response(),
        3 => data(Value::Null).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

// The recorder logs the call; `cart` is derived from it
async fn to_cart() -> Json<Value> {
    data(Value::Null)
}

/// The cart holds one item per list added so far.
async fn cart(State(state): State<Arc<StubState>>) -> Json<Value> {
    let items: Vec<Value> = state
        .calls()
        .iter()
        .filter(|c| c.method == "POST" && c.path.ends_with("/to-cart/"))
        .map(|c| match c.path.as_str() {
            "/api/lists/1/to-cart/" => json!({ "name": "Молоко 3,2%" }),
            _ => json!({ "name": "Бананы" }),
        })
        .collect();
    data(json!({ "items": items }))
}

async fn cards() -> Json<Value> {
    data(json!({
        "results": [
            { "id": 10, "is_current": false },
            { "id": 11, "is_current": true }
        ]
    }))
}

async fn timeslot() -> Json<Value> {
    data(json!({ "id": 77 }))
}

async fn checkout() -> Json<Value> {
    data(json!({ "total_amount": 1500 }))
}

async fn create_order() -> Json<Value> {
    data(json!({ "id": 501 }))
}

async fn apply_payment() -> Json<Value> {
    data(json!({ "order_token": "order-token-1" }))
}

async fn confirm_payment() -> Json<Value> {
    data(json!({
        "workflow_uuid": NEXT_WORKFLOW,
        "delivery_info": {
            "total_amount": "1500.00",
            "address": "ул. Ленина, 1",
            "start_time": "2026-10-17T18:00:00+03:00",
            "end_time": "2026-10-17T19:00:00+03:00"
        }
    }))
}

/// The skill served over HTTP, wired to a [`StubCommerce`].
pub struct TestSkill {
    url: Url,
    client: reqwest::Client,
}

impl TestSkill {
    /// Serve the skill router on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the skill state cannot be built or the listener cannot be bound.
    pub async fn spawn(commerce: &StubCommerce) -> Self {
        let config = SkillConfig::with_commerce_url(commerce.url());
        let state = AppState::new(&config).expect("Failed to build skill state");
        let app = routes::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind skill");
        let addr = listener.local_addr().expect("Skill has no local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: Url::parse(&format!("http://{addr}/")).expect("Skill address is a valid URL"),
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL of a skill path.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid relative URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.url.join(path).expect("Invalid skill path")
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Plays the voice platform: one user, one conversation.
pub struct Platform<'a> {
    skill: &'a TestSkill,
    user_id: String,
    message_id: u64,
    users: Value,
}

/// What the skill answered in one turn.
#[derive(Debug)]
pub struct Turn {
    pub status: StatusCode,
    pub text: String,
    pub end_session: bool,
    pub users: Value,
}

impl<'a> Platform<'a> {
    /// A user the skill has never seen.
    #[must_use]
    pub fn new(skill: &'a TestSkill, user_id: &str) -> Self {
        Self::with_users(skill, user_id, json!({}))
    }

    /// A user whose platform state already holds `users`.
    #[must_use]
    pub fn with_users(skill: &'a TestSkill, user_id: &str, users: Value) -> Self {
        Self {
            skill,
            user_id: user_id.to_string(),
            message_id: 0,
            users,
        }
    }

    /// Account store as the platform currently holds it.
    #[must_use]
    pub const fn users(&self) -> &Value {
        &self.users
    }

    /// Send `command` and keep the returned account store.
    ///
    /// # Panics
    ///
    /// Panics if the skill cannot be reached or answers with invalid JSON.
    pub async fn say(&mut self, command: &str) -> Turn {
        let body = json!({
            "meta": { "locale": "ru-RU", "timezone": "Europe/Moscow" },
            "request": {
                "command": command,
                "original_utterance": command,
                "type": "SimpleUtterance"
            },
            "session": {
                "session_id": "session-1",
                "message_id": self.message_id,
                "user": { "user_id": self.user_id },
                "application": { "application_id": "device-1" },
                "new": self.message_id == 0
            },
            "state": { "user": { "users": self.users } },
            "version": "1.0"
        });

        let response = self
            .skill
            .client()
            .post(self.skill.url("webhook"))
            .json(&body)
            .send()
            .await
            .expect("Skill unreachable");
        let status = StatusCode::from_u16(response.status().as_u16())
            .expect("Skill returned an invalid status");
        let reply: Value = response.json().await.expect("Skill returned invalid JSON");

        self.message_id += 1;
        self.users = reply["user_state_update"]["users"].clone();

        Turn {
            status,
            text: reply["response"]["text"].as_str().unwrap_or_default().to_string(),
            end_session: reply["response"]["end_session"].as_bool().unwrap_or_default(),
            users: self.users.clone(),
        }
    }
}
