#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use capstone_api::auth::jwt::{generate_access_token, JwtConfig};
use capstone_api::auth::password::hash_password;
use capstone_api::config::ServerConfig;
use capstone_api::router::build_app_router;
use capstone_api::state::AppState;
use capstone_core::types::DbId;
use capstone_db::models::user::{CreateUser, User};
use capstone_db::repositories::UserRepo;
use capstone_events::EventBus;

pub const PASSWORD: &str = "correct-horse-battery";

/// Role ids as seeded by the initial migration.
pub const ADMIN: DbId = 1;
pub const PROFESSOR: DbId = 2;
pub const STUDENT: DbId = 3;

/// A `ServerConfig` with a fixed JWT secret and no bootstrap admin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        bootstrap_admin: None,
    }
}

/// The production router over `pool`, with a fresh event bus.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool, Arc::new(EventBus::default()))
}

/// Like [`build_test_app`] but publishing to `bus`, so tests can subscribe.
pub fn build_test_app_with_bus(pool: PgPool, bus: Arc<EventBus>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: bus,
    };
    build_app_router(state, &config)
}

/// Insert a user with [`PASSWORD`] directly into the database.
pub async fn create_user(pool: &PgPool, username: &str, role_id: DbId) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: Some(format!("{username}@example.edu")),
        password_hash: hash_password(PASSWORD).unwrap(),
        full_name: format!("{username} Tester"),
        phone: None,
        major: None,
        student_code: (role_id == STUDENT).then(|| format!("SV-{username}")),
        role_id,
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// A bearer token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    let role = match user.role_id {
        ADMIN => "admin",
        PROFESSOR => "professor",
        _ => "student",
    };
    generate_access_token(user.id, role, &test_config().jwt).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}
