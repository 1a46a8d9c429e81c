// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! RBAC (Role-Based Access Control) middleware.
//!
//! Second stage of the authorization pipeline: checks that the permission
//! set carried by the authenticated context covers the route's declared
//! requirement. Runs strictly after authentication and before any resource
//! access.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use latch_core::AuthError;

use crate::auth::{AuthContext, Permission};
use crate::error::ApiError;

// =============================================================================
// RbacLayer
// =============================================================================

/// Layer for role-based access control.
///
/// Built from the operation policy table; see `crate::policy::rbac_layer`.
#[derive(Clone)]
pub struct RbacLayer {
    required_permissions: Arc<Vec<Permission>>,
    require_all: bool,
}

impl RbacLayer {
    /// Creates a layer requiring a single permission.
    pub fn require(permission: Permission) -> Self {
        Self {
            required_permissions: Arc::new(vec![permission]),
            require_all: true,
        }
    }

    /// Creates a layer requiring all specified permissions.
    pub fn require_all(permissions: Vec<Permission>) -> Self {
        Self {
            required_permissions: Arc::new(permissions),
            require_all: true,
        }
    }

    /// Creates a layer requiring any of the specified permissions.
    pub fn require_any(permissions: Vec<Permission>) -> Self {
        Self {
            required_permissions: Arc::new(permissions),
            require_all: false,
        }
    }
}

impl<S> Layer<S> for RbacLayer {
    type Service = RbacMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RbacMiddleware {
            inner,
            required_permissions: self.required_permissions.clone(),
            require_all: self.require_all,
        }
    }
}

// =============================================================================
// RbacMiddleware
// =============================================================================

/// Middleware for RBAC enforcement.
#[derive(Clone)]
pub struct RbacMiddleware<S> {
    inner: S,
    required_permissions: Arc<Vec<Permission>>,
    require_all: bool,
}

impl<S> Service<Request<Body>> for RbacMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let required = self.required_permissions.clone();
        let require_all = self.require_all;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let auth_ctx = req.extensions().get::<AuthContext>().cloned();

            let Some(ctx) = auth_ctx else {
                tracing::warn!("No auth context found, denying access");
                return Ok(ApiError::unauthorized("Authentication required").into_response());
            };

            // An empty requirement is a declared no-op stage.
            let has_permission = if required.is_empty() {
                true
            } else if require_all {
                ctx.has_all_permissions(&required)
            } else {
                ctx.has_any_permission(&required)
            };

            if has_permission {
                inner.call(req).await
            } else {
                let missing = required
                    .iter()
                    .find(|p| !ctx.has_permission(**p))
                    .map(|p| p.as_str())
                    .unwrap_or("unknown");
                tracing::warn!(
                    user_id = ?ctx.user_id,
                    required_permissions = ?required.as_slice(),
                    "Permission denied"
                );
                Ok(
                    ApiError::from(AuthError::InsufficientPermission(missing.to_string()))
                        .into_response(),
                )
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
