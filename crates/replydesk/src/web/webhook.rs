//! POST /webhook — records inbound chat messages.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::core::error::AppResult;
use crate::storage::{get_connection, messages};
use crate::telegram::webhook::{parse_update, ParsedUpdate, WebhookStatus};
use crate::web::AppState;

/// Header Telegram uses to echo the secret registered with setWebhook.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

fn status_response(code: StatusCode, status: WebhookStatus) -> Response {
    (code, Json(json!({ "status": status }))).into_response()
}

pub async fn webhook_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> AppResult<Response> {
    if let Some(expected) = state.config.webhook_secret.as_deref() {
        let provided = headers.get(SECRET_TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            log::warn!("Webhook call rejected: secret token mismatch");
            return Ok(status_response(StatusCode::UNAUTHORIZED, WebhookStatus::Unauthorized));
        }
    }

    let incoming = match parse_update(&body) {
        ParsedUpdate::NoData => {
            log::info!("Webhook called without data");
            return Ok(status_response(StatusCode::OK, WebhookStatus::NoData));
        }
        ParsedUpdate::NoMessage => return Ok(status_response(StatusCode::OK, WebhookStatus::NoMessage)),
        ParsedUpdate::Message(incoming) => incoming,
    };

    let conn = get_connection(&state.db)?;
    let id = messages::insert_message(&conn, &incoming.into_new_message())?;
    log::info!("Stored incoming message #{}", id);

    Ok(status_response(StatusCode::OK, WebhookStatus::Ok))
}
