//! REST client for the commerce platform.

use std::sync::Arc;

use alice_grocer_core::{
    ListId, OrderId, PaymentCardId, PhoneNumber, Price, TimeslotId, TokenPair, WorkflowHandle,
};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CommerceConfig;

use super::types::{CheckoutSelection, PaymentConfirmation, ShoppingList, StockLevel};
use super::wire::{
    AccessTokenData, CartData, CheckoutBody, CheckoutData, Envelope, OrderData, PaymentApplyData,
    PaymentCardData, PaymentConfirmData, RefreshBody, Results, ShoppingListData, SmsChallengeBody,
    SmsVerifyBody, StockLevelData, TimeslotData, TokenPairData,
};
use super::{CommerceApi, CommerceError};

/// Header carrying the purchase workflow handle.
const WORKFLOW_HEADER: &str = "workflow";

/// How much of an error body ends up in logs and error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Client for the grocery commerce REST API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CommerceClient {
    /// Create a new commerce API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CommerceConfig) -> Result<Self, CommerceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        // Endpoint paths are joined relative to the base, so keep any path prefix
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(CommerceClientInner { client, base_url }),
        })
    }

    /// Base URL all endpoint paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request with the auth and workflow headers applied.
    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<RequestBuilder, CommerceError> {
        let url = self.inner.base_url.join(path)?;
        let mut builder = self.inner.client.request(method, url);

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("JWT {}", token.expose_secret()))
                .map_err(|_| CommerceError::InvalidHeader("authorization".to_string()))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        if let Some(workflow) = workflow {
            let value = HeaderValue::from_str(workflow.as_str())
                .map_err(|_| CommerceError::InvalidHeader(WORKFLOW_HEADER.to_string()))?;
            builder = builder.header(WORKFLOW_HEADER, value);
        }

        Ok(builder)
    }

    /// Send a request and unwrap the `data` envelope.
    ///
    /// A 404 or an empty envelope yields `Ok(None)`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, CommerceError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Commerce API returned 404, treating as absent");
            return Ok(None);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %preview(&body),
                    "Failed to parse commerce API response"
                );
                Err(CommerceError::Parse(e))
            }
        }
    }

    /// Send a request whose response body carries nothing of interest.
    async fn execute(&self, builder: RequestBuilder) -> Result<(), CommerceError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(())
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

fn api_error(status: StatusCode, body: &str) -> CommerceError {
    tracing::error!(
        status = %status,
        body = %preview(body),
        "Commerce API returned non-success status"
    );
    CommerceError::Api {
        status: status.as_u16(),
        message: preview(body),
    }
}

#[async_trait]
impl CommerceApi for CommerceClient {
    #[instrument(skip(self, phone))]
    async fn send_sms_code(
        &self,
        phone: &PhoneNumber,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<(), CommerceError> {
        let builder = self
            .request(Method::POST, "api/auth/sms/", None, workflow)?
            .json(&SmsChallengeBody {
                phone: phone.as_str(),
            });
        self.execute(builder).await
    }

    #[instrument(skip(self, phone, code))]
    async fn verify_sms_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<TokenPair>, CommerceError> {
        let builder = self
            .request(Method::POST, "api/auth/sms/verify/", None, workflow)?
            .json(&SmsVerifyBody {
                phone: phone.as_str(),
                code,
            });

        // The platform answers a wrong code with 400/401 rather than an empty body
        match self.fetch::<TokenPairData>(builder).await {
            Ok(data) => Ok(data.map(TokenPair::from)),
            Err(CommerceError::Api { status, .. }) if status == 400 || status == 401 => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, tokens))]
    async fn refresh_token(&self, tokens: &TokenPair) -> Result<Option<String>, CommerceError> {
        let builder = self
            .request(Method::POST, "api/auth/token/refresh/", None, None)?
            .json(&RefreshBody {
                token: &tokens.access,
                refresh: &tokens.refresh,
            });

        match self.fetch::<AccessTokenData>(builder).await {
            Ok(data) => Ok(data.map(|d| d.access)),
            Err(CommerceError::Api { status, .. }) if status == 400 || status == 401 => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, token))]
    async fn shopping_lists(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Vec<ShoppingList>, CommerceError> {
        let builder = self.request(Method::GET, "api/lists/", Some(token), workflow)?;
        let lists = self
            .fetch::<Results<ShoppingListData>>(builder)
            .await?
            .map(|r| r.results)
            .unwrap_or_default();
        Ok(lists.into_iter().map(ShoppingList::from).collect())
    }

    #[instrument(skip(self, token))]
    async fn stock_levels(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        list: ListId,
    ) -> Result<Option<Vec<StockLevel>>, CommerceError> {
        let path = format!("api/lists/{list}/products/");
        let builder = self.request(Method::GET, &path, Some(token), workflow)?;
        Ok(self
            .fetch::<Results<StockLevelData>>(builder)
            .await?
            .map(|r| r.results.into_iter().map(StockLevel::from).collect()))
    }

    #[instrument(skip(self, token))]
    async fn add_list_to_cart(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        list: ListId,
    ) -> Result<(), CommerceError> {
        let path = format!("api/lists/{list}/to-cart/");
        let builder = self.request(Method::POST, &path, Some(token), workflow)?;
        self.execute(builder).await
    }

    #[instrument(skip(self, token))]
    async fn cart_items(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Vec<String>, CommerceError> {
        let builder = self.request(Method::GET, "api/cart/", Some(token), workflow)?;
        let items = self
            .fetch::<CartData>(builder)
            .await?
            .map(|c| c.items)
            .unwrap_or_default();
        Ok(items.into_iter().map(|item| item.name).collect())
    }

    #[instrument(skip(self, token))]
    async fn current_payment_card(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<PaymentCardId>, CommerceError> {
        let builder = self.request(
            Method::GET,
            "api/users/profile/cards/",
            Some(token),
            workflow,
        )?;
        let cards = self
            .fetch::<Results<PaymentCardData>>(builder)
            .await?
            .map(|r| r.results)
            .unwrap_or_default();
        Ok(cards.into_iter().find(|c| c.is_current).map(|c| c.id))
    }

    #[instrument(skip(self))]
    async fn closest_timeslot(
        &self,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<TimeslotId>, CommerceError> {
        let builder = self.request(
            Method::GET,
            "api/deliveries/closest-timeslots/",
            None,
            workflow,
        )?;
        Ok(self.fetch::<TimeslotData>(builder).await?.map(|t| t.id))
    }

    #[instrument(skip(self, token))]
    async fn checkout(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
        selection: CheckoutSelection,
    ) -> Result<Option<Price>, CommerceError> {
        let builder = self
            .request(
                Method::POST,
                "api/orders/workflow/checkout-v2/",
                Some(token),
                workflow,
            )?
            .json(&CheckoutBody::from(selection));
        Ok(self
            .fetch::<CheckoutData>(builder)
            .await?
            .and_then(|c| c.total_amount)
            .map(Price::rub))
    }

    #[instrument(skip(self, token))]
    async fn create_order(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<OrderId>, CommerceError> {
        let builder = self
            .request(Method::POST, "api/orders/", Some(token), workflow)?
            .json(&serde_json::json!({}));
        Ok(self.fetch::<OrderData>(builder).await?.map(|o| o.id))
    }

    #[instrument(skip(self, token))]
    async fn apply_payment(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<String>, CommerceError> {
        let builder = self
            .request(Method::POST, "api/payments/apply/", Some(token), workflow)?
            .json(&serde_json::json!({}));
        Ok(self
            .fetch::<PaymentApplyData>(builder)
            .await?
            .and_then(|p| p.order_token))
    }

    #[instrument(skip(self, token))]
    async fn confirm_payment(
        &self,
        token: &SecretString,
        workflow: Option<&WorkflowHandle>,
    ) -> Result<Option<PaymentConfirmation>, CommerceError> {
        let builder = self
            .request(Method::POST, "api/payments/confirm/", Some(token), workflow)?
            .json(&serde_json::json!({}));
        Ok(self
            .fetch::<PaymentConfirmData>(builder)
            .await?
            .map(PaymentConfirmation::from))
    }
}
