// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for LATCH.
//!
//! This module defines the error type system shared across the workspace:
//!
//! - Provides clear, descriptive error messages for diagnostics
//! - Maps every failure to an HTTP status code
//! - Keeps client-visible messages generic so that failures cannot be used
//!   to enumerate accounts, permissions or resources
//!
//! # Error Hierarchy
//!
//! ```text
//! LatchError (root)
//! ├── AuthError   - Authentication / authorization failures
//! └── StoreError  - Store seam failures
//! ```

use thiserror::Error;

// =============================================================================
// LatchError - Root Error Type
// =============================================================================

/// The root error type for LATCH.
#[derive(Debug, Error)]
pub enum LatchError {
    /// Authentication or authorization error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LatchError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            LatchError::Auth(e) => e.status_code(),
            LatchError::Store(_) => 500,
        }
    }

    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            LatchError::Auth(_) => "auth",
            LatchError::Store(_) => "store",
        }
    }
}

// =============================================================================
// AuthError
// =============================================================================

/// Authentication and authorization failures.
///
/// Every variant is terminal for the current request; none are retried
/// internally. `TokenExpired` is the only variant a client is expected to
/// recover from (refresh, then retry once).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email/password verification failed.
    ///
    /// Deliberately does not say which of the two was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token signature, structure, issuer or audience is invalid.
    #[error("token is invalid")]
    TokenInvalid,

    /// Token is structurally valid but past its expiry.
    #[error("token has expired")]
    TokenExpired,

    /// Token decoded but required claims are missing or malformed.
    #[error("token claims are malformed")]
    ClaimsMalformed,

    /// Refresh token was not accepted.
    ///
    /// Covers both "unknown token" and "reuse of a rotated token" so the
    /// response does not reveal which occurred.
    #[error("refresh token rejected")]
    RefreshRejected,

    /// The principal lacks a required permission.
    #[error("missing required permission '{0}'")]
    InsufficientPermission(String),

    /// The requester is not the creator of the resource.
    #[error("requester is not the resource owner")]
    NotResourceOwner,

    /// The requester is not the assignee of the resource.
    #[error("requester is not the assignee")]
    NotAssignee,

    /// The resource's assignment state does not allow the operation.
    #[error("assignment state does not permit this operation")]
    InvalidAssignmentState,

    /// The referenced resource does not exist.
    #[error("resource not found")]
    ResourceNotFound,
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    ///
    /// Authentication failures are always 401; authorization failures are
    /// always 403; a missing resource is 404.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::ClaimsMalformed => 401,
            AuthError::RefreshRejected
            | AuthError::InsufficientPermission(_)
            | AuthError::NotResourceOwner
            | AuthError::NotAssignee
            | AuthError::InvalidAssignmentState => 403,
            AuthError::ResourceNotFound => 404,
        }
    }

    /// Returns `true` if the failure should be surfaced to security audit.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            AuthError::RefreshRejected
                | AuthError::InsufficientPermission(_)
                | AuthError::NotResourceOwner
                | AuthError::NotAssignee
                | AuthError::InvalidAssignmentState
        )
    }

    /// Returns `true` if a client may recover by refreshing its tokens.
    pub fn is_recoverable_by_refresh(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Returns a user-friendly error message.
    ///
    /// The message is deliberately generic; internal distinctions (which
    /// permission was missing, whether a refresh token was unknown or
    /// replayed) stay in server-side diagnostics only.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "이메일 또는 비밀번호가 올바르지 않습니다".to_string(),
            AuthError::TokenInvalid | AuthError::ClaimsMalformed => {
                "인증이 필요합니다".to_string()
            }
            AuthError::TokenExpired => "인증이 만료되었습니다".to_string(),
            AuthError::RefreshRejected => "세션을 갱신할 수 없습니다".to_string(),
            AuthError::InsufficientPermission(_)
            | AuthError::NotResourceOwner
            | AuthError::NotAssignee
            | AuthError::InvalidAssignmentState => "접근 권한이 없습니다".to_string(),
            AuthError::ResourceNotFound => "리소스를 찾을 수 없습니다".to_string(),
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Failures of the store seams.
///
/// The in-memory stores cannot fail, but external implementations (a SQL
/// backend behind the same traits) can; handlers map these to 500.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store is unavailable.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Diagnostic message.
        message: String,
    },

    /// A uniqueness constraint was violated.
    #[error("duplicate key: {key}")]
    DuplicateKey {
        /// The offending key.
        key: String,
    },
}

impl StoreError {
    /// Creates an `Unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a `DuplicateKey` error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::TokenInvalid.status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::ClaimsMalformed.status_code(), 401);
        assert_eq!(AuthError::RefreshRejected.status_code(), 403);
        assert_eq!(
            AuthError::InsufficientPermission("create:tasks".into()).status_code(),
            403
        );
        assert_eq!(AuthError::NotResourceOwner.status_code(), 403);
        assert_eq!(AuthError::NotAssignee.status_code(), 403);
        assert_eq!(AuthError::InvalidAssignmentState.status_code(), 403);
        assert_eq!(AuthError::ResourceNotFound.status_code(), 404);
    }

    #[test]
    fn test_recoverable_by_refresh() {
        assert!(AuthError::TokenExpired.is_recoverable_by_refresh());
        assert!(!AuthError::TokenInvalid.is_recoverable_by_refresh());
        assert!(!AuthError::RefreshRejected.is_recoverable_by_refresh());
    }

    #[test]
    fn test_security_events() {
        assert!(AuthError::RefreshRejected.is_security_event());
        assert!(AuthError::NotResourceOwner.is_security_event());
        assert!(!AuthError::TokenExpired.is_security_event());
        assert!(!AuthError::InvalidCredentials.is_security_event());
    }

    #[test]
    fn test_uniform_messages_do_not_leak() {
        // RBAC and ABAC denials must be indistinguishable to a client.
        let rbac = AuthError::InsufficientPermission("delete:tasks".into()).user_message();
        let abac = AuthError::NotResourceOwner.user_message();
        assert_eq!(rbac, abac);
    }

    #[test]
    fn test_root_error_conversion() {
        let err: LatchError = AuthError::ResourceNotFound.into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_type(), "auth");

        let err: LatchError = StoreError::unavailable("connection refused").into();
        assert_eq!(err.status_code(), 500);
    }
}
