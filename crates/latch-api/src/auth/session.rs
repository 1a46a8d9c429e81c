// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session management: login, refresh rotation and logout.
//!
//! A session family is the lineage of refresh tokens descending from one
//! login. Each refresh consumes the presented token and issues a new pair;
//! presenting a consumed token again is treated as theft and revokes the
//! whole family. The session manager is the only writer of the refresh
//! token store.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use latch_core::audit::{AuditLog, AuditLogger};
use latch_core::store::{hash_refresh_token, RefreshTokenStore, RefreshValidation, UserStore};
use latch_core::types::{UserId, UserRecord};
use latch_core::AuthError;

use super::jwt::{TokenCodec, TokenKind};
use super::password::CredentialVerifier;
use super::permission::PermissionSet;
use super::rbac::RbacPolicy;
use crate::error::ApiResult;

// =============================================================================
// TokenPair
// =============================================================================

/// The token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token with embedded permissions.
    pub access_token: String,
    /// Single-use refresh token.
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

// =============================================================================
// SessionManager
// =============================================================================

/// Orchestrates the token lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    codec: Arc<TokenCodec>,
    rbac: Arc<RbacPolicy>,
    audit: Arc<dyn AuditLogger>,
    verifier: CredentialVerifier,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        codec: Arc<TokenCodec>,
        rbac: Arc<RbacPolicy>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        let verifier = CredentialVerifier::new(users.clone());
        Self {
            users,
            refresh_tokens,
            codec,
            rbac,
            audit,
            verifier,
        }
    }

    /// Authenticates a user and starts a new session family.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> ApiResult<TokenPair> {
        let user = match self.verifier.verify(email, password).await {
            Ok(user) => user,
            Err(err) => {
                self.audit_entry(AuditLog::login_failed(email, client_ip)).await;
                return Err(err);
            }
        };

        let permissions = self.rbac.permissions_for(&user.roles);
        let pair = self.issue_pair(&user, &permissions).await?;

        self.audit_entry(AuditLog::login(user.id, client_ip)).await;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(pair)
    }

    /// Rotates a refresh token into a new token pair.
    ///
    /// Every path out of this function other than success maps to
    /// [`AuthError::RefreshRejected`]: the caller cannot distinguish an
    /// unknown token, an expired one or a detected replay, by design.
    pub async fn refresh(
        &self,
        raw_refresh_token: &str,
        client_ip: Option<IpAddr>,
    ) -> ApiResult<TokenPair> {
        let claims = self
            .codec
            .verify(TokenKind::Refresh, raw_refresh_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token failed verification");
                AuthError::RefreshRejected
            })?;
        let user_id = claims.user_id().map_err(|_| AuthError::RefreshRejected)?;

        let token_hash = hash_refresh_token(raw_refresh_token);

        match self
            .refresh_tokens
            .validate_and_revoke(user_id, &token_hash)
            .await?
        {
            RefreshValidation::Rotated => {}
            RefreshValidation::NotFound => {
                tracing::debug!(user_id = %user_id, "Refresh token not found or expired");
                return Err(AuthError::RefreshRejected.into());
            }
            RefreshValidation::ReuseDetected => {
                // A rotated token came back: assume the family is leaked and
                // burn every outstanding token for this user.
                let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;
                tracing::warn!(
                    user_id = %user_id,
                    revoked_records = revoked,
                    "Refresh token reuse detected; session family revoked"
                );
                self.audit_entry(AuditLog::token_reuse_detected(user_id, client_ip, revoked))
                    .await;
                return Err(AuthError::RefreshRejected.into());
            }
        }

        // Re-resolve the principal and permissions: role changes since login
        // take effect here.
        let Some(user) = self.users.find_by_id(user_id).await? else {
            tracing::debug!(user_id = %user_id, "Refresh for a principal that no longer exists");
            return Err(AuthError::RefreshRejected.into());
        };
        let permissions = self.rbac.permissions_for(&user.roles);

        let pair = self.issue_pair(&user, &permissions).await?;

        self.audit_entry(AuditLog::token_refreshed(user_id, client_ip)).await;
        tracing::debug!(user_id = %user_id, "Refresh token rotated");

        Ok(pair)
    }

    /// Terminates every session family of a user.
    ///
    /// Idempotent: logging out with nothing to revoke is a successful no-op.
    pub async fn logout(&self, user_id: UserId, client_ip: Option<IpAddr>) -> ApiResult<usize> {
        let revoked = self.refresh_tokens.revoke_all_for_user(user_id).await?;

        self.audit_entry(AuditLog::logout(user_id, client_ip)).await;
        tracing::info!(user_id = %user_id, revoked_records = revoked, "User logged out");

        Ok(revoked)
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Mints a token pair and persists the refresh token's digest.
    async fn issue_pair(
        &self,
        user: &UserRecord,
        permissions: &PermissionSet,
    ) -> ApiResult<TokenPair> {
        let access_token = self.codec.sign_access(user.id, &user.email, permissions)?;
        let refresh_token = self.codec.sign_refresh(user.id, &user.email)?;

        let expires_at = Utc::now() + Duration::seconds(self.codec.refresh_ttl_secs());
        self.refresh_tokens
            .create(user.id, &hash_refresh_token(&refresh_token), expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    async fn audit_entry(&self, entry: AuditLog) {
        if let Err(e) = self.audit.log(entry).await {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::auth::password::hash_password;
    use crate::auth::Permission;
    use latch_core::audit::{AuditAction, InMemoryAuditLogger};
    use latch_core::store::{InMemoryRefreshTokenStore, InMemoryUserStore};

    struct Fixture {
        manager: SessionManager,
        refresh_store: Arc<InMemoryRefreshTokenStore>,
        audit: Arc<InMemoryAuditLogger>,
        user_id: UserId,
    }

    async fn fixture() -> Fixture {
        let users = InMemoryUserStore::shared();
        let refresh_store = InMemoryRefreshTokenStore::shared();
        let audit = InMemoryAuditLogger::shared();
        let codec = Arc::new(
            TokenCodec::new(JwtConfig::new(
                "access-secret-key-that-is-long-enough-for-tests",
                "refresh-secret-key-that-is-long-enough-for-tests",
            ))
            .unwrap(),
        );

        let user = UserRecord::new(
            "editor@example.com",
            hash_password("hunter2hunter2").unwrap(),
            vec!["editor".to_string()],
        );
        let user_id = user.id;
        users.insert(user).await.unwrap();

        let manager = SessionManager::new(
            users,
            refresh_store.clone(),
            codec,
            Arc::new(RbacPolicy::new()),
            audit.clone(),
        );

        Fixture {
            manager,
            refresh_store,
            audit,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_pair() {
        let fx = fixture().await;
        let pair = fx
            .manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        let claims = fx
            .manager
            .codec()
            .verify(TokenKind::Access, &pair.access_token)
            .unwrap();
        assert_eq!(claims.user_id().unwrap(), fx.user_id);
        assert!(claims.permission_set().contains(Permission::TaskCreate));
        assert!(!claims.permission_set().contains(Permission::TaskDelete));

        assert_eq!(fx.refresh_store.active_count_for_user(fx.user_id).await, 1);
    }

    #[tokio::test]
    async fn test_login_bad_credentials_audited() {
        let fx = fixture().await;
        let err = fx
            .manager
            .login("editor@example.com", "wrong", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);

        let failures = fx
            .audit
            .entries_where(|e| e.action == AuditAction::Login && !e.result.is_success());
        assert_eq!(failures.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let fx = fixture().await;
        let pair = fx
            .manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        let next = fx.manager.refresh(&pair.refresh_token, None).await.unwrap();
        assert_ne!(next.refresh_token, pair.refresh_token);

        // Rotation leaves exactly one active token: the new one.
        assert_eq!(fx.refresh_store.active_count_for_user(fx.user_id).await, 1);
        assert_eq!(fx.refresh_store.record_count_for_user(fx.user_id).await, 2);
    }

    #[tokio::test]
    async fn test_second_use_revokes_family() {
        let fx = fixture().await;
        let pair = fx
            .manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        let rotated = fx.manager.refresh(&pair.refresh_token, None).await.unwrap();

        // Replay of the consumed token must fail...
        let err = fx
            .manager
            .refresh(&pair.refresh_token, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        let reuse = fx
            .audit
            .entries_where(|e| e.action == AuditAction::TokenReuseDetected);
        assert_eq!(reuse.len(), 1);

        // ...and must take the rest of the family down with it. Presenting
        // the revoked replacement counts as reuse again.
        assert_eq!(fx.refresh_store.active_count_for_user(fx.user_id).await, 0);
        let err = fx
            .manager
            .refresh(&rotated.refresh_token, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let fx = fixture().await;
        let pair = fx
            .manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        // The access token is signed with the other secret/audience.
        let err = fx
            .manager
            .refresh(&pair.access_token, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_refresh_rejects_forged_token() {
        let fx = fixture().await;
        let err = fx.manager.refresh("not.a.token", None).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let fx = fixture().await;
        fx.manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        let first = fx.manager.logout(fx.user_id, None).await.unwrap();
        assert_eq!(first, 1);

        let second = fx.manager.logout(fx.user_id, None).await.unwrap();
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_logout_invalidates_refresh() {
        let fx = fixture().await;
        let pair = fx
            .manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        fx.manager.logout(fx.user_id, None).await.unwrap();

        let err = fx
            .manager
            .refresh(&pair.refresh_token, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_single_winner() {
        let fx = fixture().await;
        let pair = fx
            .manager
            .login("editor@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        let manager = Arc::new(fx.manager.clone());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            let token = pair.refresh_token.clone();
            handles.push(tokio::spawn(
                async move { manager.refresh(&token, None).await },
            ));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "exactly one concurrent refresh may succeed");

        // The losing attempts tripped reuse detection, so at most the
        // winner's token may remain and never more than one.
        assert!(fx.refresh_store.active_count_for_user(fx.user_id).await <= 1);
    }
}
