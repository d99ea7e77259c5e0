//! API integration tests.
//!
//! These tests drive the full router, auth middleware included, against a
//! mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use campus_api::{AppState, app};
use campus_common::config::MessagingConfig;
use campus_core::{MessagingService, NoticeService, UserService};
use campus_db::{
    entities::{message, offering, offering_student, user},
    repositories::{MessageRepository, NoticeRepository, OfferingRepository, UserRepository},
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_user() -> user::Model {
    user::Model {
        id: "u1".to_string(),
        username: "instructor".to_string(),
        username_lower: "instructor".to_string(),
        name: None,
        token: Some("token1".to_string()),
        is_active: true,
        created_at: Utc::now().into(),
    }
}

fn create_test_message(id: &str, recipient: &str) -> message::Model {
    message::Model {
        id: id.to_string(),
        sender_id: "u1".to_string(),
        recipient_id: recipient.to_string(),
        subject: "Lab".to_string(),
        body: "Cancelled".to_string(),
        parent_id: None,
        sent_at: Utc::now().into(),
        read_at: None,
        replied_at: None,
    }
}

/// Create the test router over a prepared mock database.
fn create_test_router(db: MockDatabase) -> Router {
    let db = Arc::new(db.into_connection());
    let config = MessagingConfig::default();

    let state = AppState {
        user_service: UserService::new(UserRepository::new(Arc::clone(&db))),
        messaging_service: MessagingService::new(
            MessageRepository::new(Arc::clone(&db)),
            OfferingRepository::new(Arc::clone(&db)),
            None,
            &config,
        ),
        notice_service: NoticeService::new(NoticeRepository::new(db), config.inbox_limit),
    };

    app(state)
}

/// Mock database whose first query authenticates the bearer token.
fn authenticated_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[create_test_user()]])
}

fn compose_request(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_compose_requires_auth() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(compose_request(
            "/api/messaging/compose",
            None,
            r#"{"recipient":"alice","subject":"Hi","body":"Hello"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_compose_group_reports_field_errors() {
    let app = create_test_router(authenticated_db());

    let response = app
        .oneshot(compose_request(
            "/api/messaging/compose/group",
            Some("token1"),
            r#"{"recipient":"group-offering-12345","body":"Hello"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["fields"]["subject"][0], "This field is required.");
}

#[tokio::test]
async fn test_compose_group_world_is_unsupported() {
    let app = create_test_router(authenticated_db());

    let response = app
        .oneshot(compose_request(
            "/api/messaging/compose/group",
            Some("token1"),
            r#"{"recipient":"group-world-all","subject":"Hi","body":"Hello"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_GROUP_TYPE");
}

#[tokio::test]
async fn test_compose_group_fans_out() {
    let db = authenticated_db()
        .append_query_results([[offering::Model {
            id: "off1".to_string(),
            course_sec_id: "12345".to_string(),
            title: "Networks".to_string(),
            created_at: Utc::now().into(),
        }]])
        .append_query_results([["u2", "u3"].map(|user_id| offering_student::Model {
            id: format!("e-{user_id}"),
            offering_id: "off1".to_string(),
            user_id: user_id.to_string(),
            enrolled_at: Utc::now().into(),
        })])
        .append_query_results([
            [create_test_message("m1", "u2")],
            [create_test_message("m2", "u3")],
        ]);
    let app = create_test_router(db);

    let response = app
        .oneshot(compose_request(
            "/api/messaging/compose/group",
            Some("token1"),
            r#"{"recipient":"group-offering-12345","subject":"Lab","body":"Cancelled"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["recipientId"], "u2");
    assert_eq!(messages[1]["recipientId"], "u3");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(MockDatabase::new(DatabaseBackend::Postgres));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_lookup_failure_is_server_error() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection refused".to_string())]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messaging/inbox")
                .method("GET")
                .header("Authorization", "Bearer token1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messaging/inbox")
                .method("GET")
                .header("Authorization", "Bearer bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
