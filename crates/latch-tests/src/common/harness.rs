// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request harness over the router.
//!
//! Drives the full middleware stack via `tower::ServiceExt::oneshot`, so
//! every request exercises the same pipeline a live server would.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::fixtures::{TestEnv, TEST_PASSWORD};

/// A decoded response: status plus parsed JSON body.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed body; `Value::Null` when the body was empty.
    pub body: Value,
}

impl TestResponse {
    /// Asserts the status and returns self for chaining.
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "unexpected status; body: {}",
            self.body
        );
        self
    }

    /// Returns a string field from the body, panicking if absent.
    pub fn string_field(&self, pointer: &str) -> String {
        self.body
            .pointer(pointer)
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| panic!("missing field {pointer} in {}", self.body))
            .to_string()
    }
}

/// Sends one request through the router.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request must build"),
        None => builder.body(Body::empty()).expect("request must build"),
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router must respond");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse { status, body }
}

/// GET shorthand.
pub async fn get(router: &Router, uri: &str, bearer: Option<&str>) -> TestResponse {
    send(router, Method::GET, uri, bearer, None).await
}

/// POST shorthand.
pub async fn post(
    router: &Router,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    send(router, Method::POST, uri, bearer, body).await
}

/// PUT shorthand.
pub async fn put(
    router: &Router,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    send(router, Method::PUT, uri, bearer, body).await
}

/// DELETE shorthand.
pub async fn delete(router: &Router, uri: &str, bearer: Option<&str>) -> TestResponse {
    send(router, Method::DELETE, uri, bearer, None).await
}

// =============================================================================
// Auth Flows
// =============================================================================

/// A logged-in session: the token pair returned by the API.
#[derive(Debug, Clone)]
pub struct Session {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
}

/// Logs an account in through the HTTP surface.
pub async fn login(env: &TestEnv, email: &str) -> Session {
    let response = post(
        &env.router,
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await
    .assert_status(StatusCode::OK);

    Session {
        access_token: response.string_field("/access_token"),
        refresh_token: response.string_field("/refresh_token"),
    }
}

/// Exchanges a refresh token through the HTTP surface.
pub async fn refresh(env: &TestEnv, refresh_token: &str) -> TestResponse {
    post(
        &env.router,
        "/api/v1/auth/refresh",
        Some(refresh_token),
        None,
    )
    .await
}

/// Creates a task as the given session and returns its ID.
pub async fn create_task(env: &TestEnv, session: &Session, title: &str) -> String {
    let response = post(
        &env.router,
        "/api/v1/tasks",
        Some(&session.access_token),
        Some(serde_json::json!({ "title": title })),
    )
    .await
    .assert_status(StatusCode::CREATED);

    response.string_field("/data/id")
}
