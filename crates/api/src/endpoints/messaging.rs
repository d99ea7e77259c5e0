//! Messaging endpoints for private messages.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use campus_common::AppResult;
use campus_core::{CleanedCompose, ComposeForm, ComposeGroupForm};
use campus_db::entities::{message, user};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create messaging router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compose", post(compose))
        .route("/compose/group", post(compose_group))
        .route("/inbox", get(inbox))
        .route("/outbox", get(outbox))
        .route("/message/{message_id}", get(open_message))
}

/// Message response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub parent_id: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
}

impl From<message::Model> for MessageResponse {
    fn from(msg: message::Model) -> Self {
        Self {
            id: msg.id,
            sender_id: msg.sender_id,
            recipient_id: msg.recipient_id,
            subject: msg.subject,
            body: msg.body,
            parent_id: msg.parent_id,
            sent_at: msg.sent_at.into(),
            read_at: msg.read_at.map(Into::into),
            replied_at: msg.replied_at.map(Into::into),
        }
    }
}

/// Compose request, shared by the individual and group forms.
///
/// Missing text fields default to empty so they fail form validation
/// with a per-field message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub parent_id: Option<String>,
}

/// Compose response.
#[derive(Debug, Serialize)]
pub struct ComposeResponse {
    pub messages: Vec<MessageResponse>,
}

/// Message list response.
#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
}

/// List query.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Compose to a comma-separated list of usernames.
async fn compose(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ComposeRequest>,
) -> AppResult<ApiResponse<ComposeResponse>> {
    let form = ComposeForm {
        recipient: req.recipient,
        subject: req.subject,
        body: req.body,
    };
    let cleaned = form.clean(state.user_service.repository(), None).await?;

    send(&state, &user, cleaned, req.parent_id.as_deref()).await
}

/// Compose to a `group-<type>-<id>` token.
async fn compose_group(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ComposeRequest>,
) -> AppResult<ApiResponse<ComposeResponse>> {
    let form = ComposeGroupForm {
        recipient: req.recipient,
        subject: req.subject,
        body: req.body,
    };
    let cleaned = form.clean()?;

    send(&state, &user, cleaned, req.parent_id.as_deref()).await
}

async fn send(
    state: &AppState,
    user: &user::Model,
    cleaned: CleanedCompose,
    parent_id: Option<&str>,
) -> AppResult<ApiResponse<ComposeResponse>> {
    let mut parent = match parent_id {
        Some(id) => Some(state.messaging_service.reply_parent(&user.id, id).await?),
        None => None,
    };

    let messages = state
        .messaging_service
        .compose(&user.id, &cleaned.recipients, &cleaned.draft, parent.as_mut())
        .await?;

    info!(
        user_id = %user.id,
        count = messages.len(),
        reply = parent_id.is_some(),
        "Compose request handled"
    );

    Ok(ApiResponse::created(ComposeResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// Messages received by the authenticated user.
async fn inbox(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<MessageListResponse>> {
    let messages = state.messaging_service.inbox(&user.id, query.limit).await?;

    Ok(ApiResponse::ok(MessageListResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// Messages sent by the authenticated user.
async fn outbox(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<MessageListResponse>> {
    let messages = state.messaging_service.outbox(&user.id, query.limit).await?;

    Ok(ApiResponse::ok(MessageListResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// View a message. Marks it read when the viewer is the recipient.
async fn open_message(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let message = state
        .messaging_service
        .open_message(&user.id, &message_id)
        .await?;

    Ok(ApiResponse::ok(message.into()))
}
