//! Stored message notices.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use campus_common::AppResult;
use campus_db::entities::notice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create notices router.
pub fn router() -> Router<AppState> {
    Router::new().route("/notices", get(list_notices))
}

/// Notice response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub id: String,
    pub label: &'static str,
    pub message_id: String,
    pub is_unseen: bool,
    pub created_at: DateTime<Utc>,
}

impl From<notice::Model> for NoticeResponse {
    fn from(n: notice::Model) -> Self {
        Self {
            id: n.id,
            label: n.label.as_str(),
            message_id: n.message_id,
            is_unseen: n.is_unseen,
            created_at: n.created_at.into(),
        }
    }
}

/// Notice list response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeListResponse {
    pub notices: Vec<NoticeResponse>,
    pub unseen_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct NoticesQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

/// List the authenticated user's message notices.
async fn list_notices(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NoticesQuery>,
) -> AppResult<ApiResponse<NoticeListResponse>> {
    let notices = state.notice_service.list(&user.id, query.limit).await?;
    let unseen_count = state.notice_service.unseen_count(&user.id).await?;

    Ok(ApiResponse::ok(NoticeListResponse {
        notices: notices.into_iter().map(NoticeResponse::from).collect(),
        unseen_count,
    }))
}
