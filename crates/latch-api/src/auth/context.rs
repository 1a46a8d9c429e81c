// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use latch_core::types::UserId;
use latch_core::AuthError;

use super::claims::Claims;
use super::permission::PermissionSet;
use super::Permission;

/// Authentication context for a request.
///
/// Attached to the request by the authentication middleware. The permission
/// set is rebuilt from the access-token claims; no store lookup happens on
/// the request path.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user, or `None` for anonymous (public-path) requests.
    pub user_id: Option<UserId>,
    /// User's email, when the token carried one.
    pub email: Option<String>,
    /// Permission set embedded in the access token.
    pub permissions: Arc<PermissionSet>,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates an authenticated context from verified access-token claims.
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        Ok(Self {
            user_id: Some(claims.user_id()?),
            email: claims.email.clone(),
            permissions: Arc::new(claims.permission_set()),
            client_ip: None,
            request_id: Uuid::now_v7(),
        })
    }

    /// Creates an anonymous context (for public paths).
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            email: None,
            permissions: Arc::new(PermissionSet::new()),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the authenticated user ID, failing closed for anonymous
    /// contexts.
    pub fn require_user_id(&self) -> Result<UserId, AuthError> {
        self.user_id.ok_or(AuthError::TokenInvalid)
    }

    /// Returns `true` if this is an anonymous context.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Returns `true` if the context has the given permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the context has all of the given permissions.
    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        self.permissions.contains_all(permissions)
    }

    /// Returns `true` if the context has any of the given permissions.
    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        self.permissions.contains_any(permissions)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_claims() {
        let user = UserId::generate();
        let perms = PermissionSet::from_permissions([Permission::TaskRead]);
        let claims = Claims::new(user, 3600)
            .with_email("user@example.com")
            .with_permissions(&perms);

        let ctx = AuthContext::from_claims(&claims).unwrap();

        assert_eq!(ctx.user_id, Some(user));
        assert_eq!(ctx.require_user_id().unwrap(), user);
        assert!(!ctx.is_anonymous());
        assert!(ctx.has_permission(Permission::TaskRead));
        assert!(!ctx.has_permission(Permission::TaskDelete));
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();

        assert!(ctx.is_anonymous());
        assert!(ctx.require_user_id().is_err());
        assert!(!ctx.has_permission(Permission::TaskRead));
    }

    #[test]
    fn test_context_rejects_malformed_subject() {
        let mut claims = Claims::new(UserId::generate(), 3600);
        claims.sub = "garbage".to_string();
        assert!(AuthContext::from_claims(&claims).is_err());
    }
}
