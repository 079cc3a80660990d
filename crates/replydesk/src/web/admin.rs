//! Protected dashboard views. Every handler here runs behind `auth::require_admin`.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use serde::Deserialize;

use crate::core::error::{AppError, AppResult};
use crate::storage::{get_connection, messages, AdminSession, Message};
use crate::telegram::DeliveryOutcome;
use crate::web::render::{self, Notice};
use crate::web::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub delivery: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyForm {
    pub reply: String,
}

/// Ids come from the URL; anything that is not an integer cannot exist.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("message '{}'", raw)))
}

fn load_message(state: &AppState, id: i64) -> AppResult<Message> {
    let conn = get_connection(&state.db)?;
    messages::get_message(&conn, id)?.ok_or_else(|| AppError::NotFound(format!("message {}", id)))
}

/// GET /admin — every message, newest first.
pub async fn list_handler(State(state): State<AppState>, Query(query): Query<ListQuery>) -> AppResult<Html<String>> {
    let notice = match query.delivery.as_deref() {
        Some("delivered") => Some(Notice::Delivered),
        Some("failed") => Some(Notice::DeliveryFailed),
        _ => None,
    };

    let conn = get_connection(&state.db)?;
    let messages = messages::list_messages(&conn)?;

    Ok(Html(render::message_list_page(&messages, notice)))
}

/// GET /message/{id}
pub async fn detail_handler(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Html<String>> {
    let message = load_message(&state, parse_id(&id)?)?;
    Ok(Html(render::message_detail_page(&message)))
}

/// POST /message/{id} — send the reply, then record it whatever the delivery outcome.
pub async fn reply_handler(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    Form(form): Form<ReplyForm>,
) -> AppResult<Response> {
    let message = load_message(&state, parse_id(&id)?)?;

    let outcome = state.notifier.send_message(&message.user_id, &form.reply).await;

    let conn = get_connection(&state.db)?;
    messages::mark_replied(&conn, message.id, &form.reply, Utc::now())?;

    let target = match outcome {
        DeliveryOutcome::Delivered => {
            log::info!("Admin '{}' replied to message #{}", session.username, message.id);
            "/admin?delivery=delivered"
        }
        DeliveryOutcome::Failed(reason) => {
            log::warn!(
                "Admin '{}' replied to message #{} but delivery failed: {}",
                session.username,
                message.id,
                reason
            );
            "/admin?delivery=failed"
        }
    };

    Ok(Redirect::to(target).into_response())
}

/// GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> AppResult<Html<String>> {
    let conn = get_connection(&state.db)?;
    let stats = messages::message_stats(&conn)?;
    Ok(Html(render::stats_page(&stats)))
}
