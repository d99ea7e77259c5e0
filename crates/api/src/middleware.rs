//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use campus_common::AppError;
use campus_core::{MessagingService, NoticeService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub messaging_service: MessagingService,
    pub notice_service: NoticeService,
}

/// Authentication middleware.
///
/// A valid `Authorization: Bearer <token>` header puts the user into the
/// request extensions. An unknown or inactive token passes through
/// unauthenticated. A failed lookup is returned as the server error it is.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => {
                tracing::debug!("Token authentication failed");
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
