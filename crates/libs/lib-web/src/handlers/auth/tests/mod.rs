//! # Auth Handler Tests
//!
//! Test suite for the signup, login and protected endpoints, driven through the
//! production router against an in-memory database.

mod signup;

use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use lib_auth::TokenService;
use lib_core::{init_schema, DbPool};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

/// Setup test database with schema
pub async fn setup_test_db() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    init_schema(&pool).await.expect("Failed to create users table");

    pool
}

pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_SECRET, Duration::minutes(60))
}

/// Create test app with routes
pub fn test_app(pool: DbPool, tokens: TokenService) -> Router {
    create_router(AppState { db: pool, tokens }, &[])
}

pub async fn default_app() -> (Router, DbPool) {
    let pool = setup_test_db().await;
    (test_app(pool.clone(), test_tokens()), pool)
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Send a request and return the status with the JSON body (`Value::Null` when not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub async fn signup(app: &Router, name: &str, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request("/signup", json!({"name": name, "username": username, "password": password})),
    )
    .await
}

pub async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request("/login", json!({"username": username, "password": password})),
    )
    .await
}
