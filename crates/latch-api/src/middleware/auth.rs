// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT authentication middleware.
//!
//! First stage of the authorization pipeline: extracts the bearer token,
//! verifies it as an access token and attaches the resulting
//! [`AuthContext`] to the request. The permission set comes straight out of
//! the verified claims; no store lookup happens here.

use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, TokenCodec, TokenKind};
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for JWT authentication.
///
/// Wraps services to authenticate requests. Paths on the public allowlist
/// pass through with an anonymous context.
#[derive(Clone)]
pub struct AuthLayer {
    codec: Arc<TokenCodec>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self {
            codec,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with the default public paths.
    ///
    /// Refresh is public at this stage: its bearer token is a refresh token,
    /// which the session manager verifies itself.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(vec![
            "/health".to_string(),
            "/ready".to_string(),
            "/api/v1/auth/login".to_string(),
            "/api/v1/auth/refresh".to_string(),
        ])
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            codec: self.codec.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for JWT authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    codec: Arc<TokenCodec>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        // Prefix entries end with '*'.
        for public_path in self.public_paths.iter() {
            if let Some(prefix) = public_path.strip_suffix('*') {
                if path.starts_with(prefix) {
                    return true;
                }
            }
        }

        false
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let codec = self.codec.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let request_id = Uuid::now_v7();

            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            // Public paths still get a context so downstream extractors work.
            if is_public {
                let mut auth_ctx = AuthContext::anonymous().with_request_id(request_id);
                if let Some(ip) = client_ip {
                    auth_ctx = auth_ctx.with_client_ip(ip);
                }
                req.extensions_mut().insert(auth_ctx);
                return inner.call(req).await;
            }

            let Some(token) = extract_bearer_token(&req) else {
                tracing::debug!("No authorization token provided");
                return Ok(
                    ApiError::unauthorized("No authorization token provided").into_response()
                );
            };

            let auth_ctx = match codec.verify(TokenKind::Access, &token) {
                Ok(claims) => match AuthContext::from_claims(&claims) {
                    Ok(ctx) => {
                        let mut ctx = ctx.with_request_id(request_id);
                        if let Some(ip) = client_ip {
                            ctx = ctx.with_client_ip(ip);
                        }
                        ctx
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Access token claims rejected");
                        return Ok(ApiError::from(e).into_response());
                    }
                },
                Err(e) => {
                    tracing::debug!(error = %e, "Access token verification failed");
                    return Ok(ApiError::from(e).into_response());
                }
            };

            req.extensions_mut().insert(auth_ctx);

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
pub(crate) fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(|s| s.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::http::{HeaderValue, StatusCode};
    use tower::ServiceExt;

    fn test_codec() -> Arc<TokenCodec> {
        Arc::new(
            TokenCodec::new(JwtConfig::new(
                "access-secret-key-that-is-long-enough-for-tests",
                "refresh-secret-key-that-is-long-enough-for-tests",
            ))
            .unwrap(),
        )
    }

    fn mock_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = std::convert::Infallible,
        Future = impl Future<Output = Result<Response, std::convert::Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        })
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();

        // No header
        assert!(extract_bearer_token(&req).is_none());

        // Invalid format
        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        // Valid bearer token
        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[test]
    fn test_public_paths() {
        let layer = AuthLayer::new(test_codec())
            .with_public_paths(vec!["/health".to_string(), "/api/public/*".to_string()]);

        let middleware = layer.layer(mock_service());

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/api/public/anything"));
        assert!(!middleware.is_public_path("/api/v1/tasks"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let layer = AuthLayer::new(test_codec());
        let mut service = layer.layer(mock_service());

        let req = Request::builder()
            .uri("/api/v1/tasks")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let layer = AuthLayer::new(test_codec());
        let mut service = layer.layer(mock_service());

        let req = Request::builder()
            .uri("/api/v1/tasks")
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let codec = test_codec();
        let token = codec
            .sign_access(
                latch_core::types::UserId::generate(),
                "user@example.com",
                &crate::auth::permission::PermissionSet::new(),
            )
            .unwrap();

        let layer = AuthLayer::new(codec);
        let mut service = layer.layer(mock_service());

        let req = Request::builder()
            .uri("/api/v1/tasks")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
