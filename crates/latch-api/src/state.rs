// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use latch_core::audit::{AuditLogger, NoOpAuditLogger};
use latch_core::store::{
    InMemoryRefreshTokenStore, InMemoryTaskStore, InMemoryUserStore, RefreshTokenStore, TaskStore,
    UserStore,
};

use crate::auth::{RbacPolicy, SessionManager, TokenCodec};
use crate::config::ApiConfig;
use crate::error::ApiResult;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// This is the central state container passed to handlers via Axum's state
/// extraction mechanism.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token codec for signing and verification.
    pub codec: Arc<TokenCodec>,
    /// RBAC policy (role → permission graph).
    pub rbac_policy: Arc<RbacPolicy>,
    /// User store.
    pub users: Arc<dyn UserStore>,
    /// Refresh token store.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    /// Task store.
    pub tasks: Arc<dyn TaskStore>,
    /// Session manager.
    pub sessions: Arc<SessionManager>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token codec.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the RBAC policy.
    pub fn rbac(&self) -> &RbacPolicy {
        &self.rbac_policy
    }

    /// Returns the user store.
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Returns the task store.
    pub fn tasks(&self) -> &Arc<dyn TaskStore> {
        &self.tasks
    }

    /// Returns the session manager.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing `AppState`.
///
/// Components left unset fall back to in-memory implementations, which is
/// what the binary and the test suites use.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    codec: Option<Arc<TokenCodec>>,
    rbac_policy: Option<Arc<RbacPolicy>>,
    users: Option<Arc<dyn UserStore>>,
    refresh_tokens: Option<Arc<dyn RefreshTokenStore>>,
    tasks: Option<Arc<dyn TaskStore>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            codec: None,
            rbac_policy: None,
            users: None,
            refresh_tokens: None,
            tasks: None,
            audit_logger: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token codec.
    pub fn codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Sets the RBAC policy.
    pub fn rbac_policy(mut self, policy: Arc<RbacPolicy>) -> Self {
        self.rbac_policy = Some(policy);
        self
    }

    /// Sets the user store.
    pub fn users(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    /// Sets the refresh token store.
    pub fn refresh_tokens(mut self, store: Arc<dyn RefreshTokenStore>) -> Self {
        self.refresh_tokens = Some(store);
        self
    }

    /// Sets the task store.
    pub fn tasks(mut self, tasks: Arc<dyn TaskStore>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the `AppState`.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let codec = match self.codec {
            Some(codec) => codec,
            None => Arc::new(TokenCodec::new(config.jwt.clone())?),
        };

        let rbac_policy = self
            .rbac_policy
            .unwrap_or_else(|| Arc::new(RbacPolicy::new()));
        let users = self.users.unwrap_or_else(|| InMemoryUserStore::shared());
        let refresh_tokens = self
            .refresh_tokens
            .unwrap_or_else(|| InMemoryRefreshTokenStore::shared());
        let tasks = self.tasks.unwrap_or_else(|| InMemoryTaskStore::shared());
        let audit_logger = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(NoOpAuditLogger));

        let sessions = Arc::new(SessionManager::new(
            users.clone(),
            refresh_tokens.clone(),
            codec.clone(),
            rbac_policy.clone(),
            audit_logger.clone(),
        ));

        Ok(AppState {
            config: Arc::new(config),
            codec,
            rbac_policy,
            users,
            refresh_tokens,
            tasks,
            sessions,
            audit_logger,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;

    fn test_config() -> ApiConfig {
        let mut config = ApiConfig::default();
        config.jwt = JwtConfig::new(
            "access-secret-key-that-is-long-enough-for-tests",
            "refresh-secret-key-that-is-long-enough-for-tests",
        );
        config
    }

    #[test]
    fn test_app_state_builder_defaults() {
        let state = AppState::builder().config(test_config()).build().unwrap();

        assert_eq!(state.codec().access_ttl_secs(), 900);
        assert_eq!(state.audit().name(), "noop");
    }

    #[test]
    fn test_app_state_builder_requires_secrets() {
        // Default config has empty secrets; the codec must refuse it.
        assert!(AppState::builder().build().is_err());
    }
}
