//! Shared helpers for HTTP-level integration tests.
//!
//! `build_test_app` reuses the production router builder so tests exercise
//! the same middleware stack (CORS, request ID, timeout, tracing, panic
//! recovery) the binary uses. Requests are driven through
//! `tower::ServiceExt::oneshot`; each request consumes a router clone.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use dentapp_api::auth::jwt::JwtConfig;
use dentapp_api::config::ServerConfig;
use dentapp_api::router::build_app_router;
use dentapp_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        cookie_secure: false,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 604_800,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Drive one request through the router.
async fn send(
    app: Router,
    method: Method,
    path: &str,
    cookies: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(COOKIE, cookies);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, path: &str) -> Response {
    send(app, Method::GET, path, None, None).await
}

pub async fn get_with_cookies(app: Router, path: &str, cookies: &str) -> Response {
    send(app, Method::GET, path, Some(cookies), None).await
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, path, None, Some(body)).await
}

pub async fn post_json_with_cookies(
    app: Router,
    path: &str,
    body: serde_json::Value,
    cookies: &str,
) -> Response {
    send(app, Method::POST, path, Some(cookies), Some(body)).await
}

pub async fn post_with_cookies(app: Router, path: &str, cookies: &str) -> Response {
    send(app, Method::POST, path, Some(cookies), None).await
}

pub async fn post_empty(app: Router, path: &str) -> Response {
    send(app, Method::POST, path, None, None).await
}

pub async fn put_json_with_cookies(
    app: Router,
    path: &str,
    body: serde_json::Value,
    cookies: &str,
) -> Response {
    send(app, Method::PUT, path, Some(cookies), Some(body)).await
}

pub async fn delete_with_cookies(app: Router, path: &str, cookies: &str) -> Response {
    send(app, Method::DELETE, path, Some(cookies), None).await
}

/// Parse the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// The `name=value` pairs of every `Set-Cookie` header, joined so they can
/// be sent back in a `Cookie` header.
pub fn cookies_from(response: &Response) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The value of one cookie set by the response.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find_map(|pair| pair.strip_prefix(&prefix).map(|v| v.to_string()))
}

/// The raw `Set-Cookie` header lines of the response.
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .collect()
}
