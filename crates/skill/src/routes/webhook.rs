//! Voice platform webhook.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::{debug, instrument};

use crate::alice::{WebhookRequest, WebhookResponse};
use crate::error::Result;
use crate::state::AppState;

/// Handle one conversation turn.
///
/// Every well-formed request gets a spoken reply, including when the
/// commerce platform is down. The account store travels in the request
/// and is written back, possibly updated, in the response.
#[instrument(skip_all, fields(message_id = tracing::field::Empty))]
pub async fn webhook(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<Json<WebhookResponse>> {
    let Json(mut request) = payload?;
    tracing::Span::current().record("message_id", request.session.message_id);

    let conversation = request.conversation_id().to_string();
    let mut accounts = request.take_accounts();

    let shared = state.sessions().get_or_create(&conversation).await;
    let mut session = shared.lock().await;
    let farewell = session.state.is_ended();

    let reply = state
        .dialog()
        .respond(&mut session, request.utterance(), &mut accounts)
        .await;
    drop(session);

    if farewell {
        debug!("Conversation finished, dropping session");
        state.sessions().remove(&conversation).await;
    }

    Ok(Json(WebhookResponse::new(
        reply.text,
        reply.end_session,
        accounts,
    )))
}
