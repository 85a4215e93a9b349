//! Integration tests for API endpoints.
//!
//! The router runs against real services on an in-memory database. No Redis
//! is configured, so rate limiting and the checkout lock are skipped.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use common::{connect, RecordingNotifier, TEST_SECRET};
use course_engine::api::middleware::Claims;
use course_engine::api::{create_router, AppState};
use course_engine::config::Config;
use course_engine::infra::Database;
use course_engine::services::EventDispatcher;

// =============================================================================
// Helpers
// =============================================================================

async fn app() -> Router {
    let database = Arc::new(Database::from_connection(connect().await));
    let dispatcher = EventDispatcher::inline(Arc::new(RecordingNotifier::default()));
    let state = AppState::from_config(database, None, Config::for_tests(TEST_SECRET), dispatcher);
    create_router(state)
}

/// Identity-provider token for a fresh user with the given role.
fn token(name: &str, role: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: format!("{}@example.com", name),
        name: name.to_string(),
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token signs")
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Instructor-owned course; returns its id.
async fn publish_course(app: &Router, instructor: &str, title: &str, price: f64) -> i64 {
    let (status, collection) = send(
        app,
        Method::POST,
        "/collections",
        Some(instructor),
        Some(json!({ "title": format!("{} collection", title) })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, course) = send(
        app,
        Method::POST,
        "/courses",
        Some(instructor),
        Some(json!({
            "title": title,
            "price": price,
            "collection_id": collection["id"],
            "preview": format!("previews/{}.mp4", title),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    course["id"].as_i64().expect("course id")
}

// =============================================================================
// Health & authentication
// =============================================================================

#[tokio::test]
async fn test_health_reports_redis_disabled() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["redis"]["status"], "disabled");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/carts/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_rejects_bad_tokens() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/carts/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown_role = token("mallory", "superuser");
    let (status, _) = send(&app, Method::GET, "/carts/me", Some(&unknown_role), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Purchase flow
// =============================================================================

#[tokio::test]
async fn test_cart_to_order_over_http() {
    let app = app().await;
    let instructor = token("ines", "instructor");
    let student = token("sam", "student");
    let course_id = publish_course(&app, &instructor, "http-course", 10.0).await;

    let (status, cart) = send(&app, Method::GET, "/carts/me", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    let cart_id = cart["id"].as_str().expect("cart id").to_string();
    let add_uri = format!("/carts/{}/add-item", cart_id);

    let (status, body) = send(&app, Method::POST, &add_uri, Some(&student), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, cart) = send(
        &app,
        Method::POST,
        &add_uri,
        Some(&student),
        Some(json!({ "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        Method::POST,
        &add_uri,
        Some(&student),
        Some(json!({ "course_id": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, order) = send(&app, Method::POST, "/orders/checkout", Some(&student), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["payment_status"], "complete");
    assert_eq!(order["items"].as_array().map(Vec::len), Some(1));

    let (status, orders) = send(&app, Method::GET, "/orders", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders["meta"]["total"], 1);

    let (status, course) = send(&app, Method::GET, &format!("/courses/{}", course_id), Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["numberOfStudents"], 1);

    let (status, progress) = send(
        &app,
        Method::GET,
        &format!("/courses/{}/progress", course_id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["completed"], false);
}

#[tokio::test]
async fn test_role_restrictions_map_to_forbidden() {
    let app = app().await;
    let admin = token("ada", "admin");
    let student = token("sam", "student");

    let (status, body) = send(&app, Method::POST, "/orders/checkout", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/orders/1/payment-status",
        Some(&student),
        Some(json!({ "status": "complete" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/collections",
        Some(&student),
        Some(json!({ "title": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_resources_map_to_not_found() {
    let app = app().await;
    let student = token("sam", "student");

    let (status, body) = send(&app, Method::GET, "/courses/404", Some(&student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Course not found");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/lessons/404/mark_as_finished",
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
