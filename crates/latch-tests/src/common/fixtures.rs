// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built test environments and accounts.

use std::sync::Arc;

use axum::Router;

use latch_api::auth::hash_password;
use latch_api::{ApiConfig, ApiServerBuilder, AppState, JwtConfig};
use latch_core::audit::InMemoryAuditLogger;
use latch_core::store::{
    InMemoryRefreshTokenStore, InMemoryTaskStore, InMemoryUserStore, UserStore,
};
use latch_core::types::{UserId, UserRecord};

/// The password every seeded test account uses.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A seeded test account.
#[derive(Debug, Clone)]
pub struct TestAccount {
    /// The account's user ID.
    pub user_id: UserId,
    /// The account's email.
    pub email: String,
}

/// A fully wired application environment backed by in-memory stores.
///
/// Keeps concrete handles to the stores and the audit logger so tests can
/// assert on internal state that the HTTP surface deliberately hides.
pub struct TestEnv {
    /// The router under test.
    pub router: Router,
    /// The shared application state.
    pub state: AppState,
    /// Concrete refresh-token store handle.
    pub refresh_store: Arc<InMemoryRefreshTokenStore>,
    /// Concrete audit logger handle.
    pub audit: Arc<InMemoryAuditLogger>,
    /// viewer role only.
    pub viewer: TestAccount,
    /// editor role; "principal A" in ownership scenarios.
    pub editor_a: TestAccount,
    /// editor role; "principal B" in ownership scenarios.
    pub editor_b: TestAccount,
    /// manager role.
    pub manager: TestAccount,
}

impl TestEnv {
    /// Builds a seeded environment.
    pub async fn new() -> Self {
        let users = InMemoryUserStore::shared();
        let refresh_store = InMemoryRefreshTokenStore::shared();
        let tasks = InMemoryTaskStore::shared();
        let audit = InMemoryAuditLogger::shared();

        let viewer = seed_account(&users, "viewer@test.dev", "viewer").await;
        let editor_a = seed_account(&users, "editor-a@test.dev", "editor").await;
        let editor_b = seed_account(&users, "editor-b@test.dev", "editor").await;
        let manager = seed_account(&users, "manager@test.dev", "manager").await;

        let server = ApiServerBuilder::new()
            .config(test_config())
            .users(users)
            .refresh_tokens(refresh_store.clone())
            .tasks(tasks)
            .audit_logger(audit.clone())
            .build()
            .expect("test server must build");

        let state = server.state().clone();
        let router = server.router();

        Self {
            router,
            state,
            refresh_store,
            audit,
            viewer,
            editor_a,
            editor_b,
            manager,
        }
    }
}

/// Returns the JWT configuration used by every test environment.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(
        "access-secret-key-that-is-long-enough-for-tests",
        "refresh-secret-key-that-is-long-enough-for-tests",
    )
}

/// Returns the API configuration used by every test environment.
pub fn test_config() -> ApiConfig {
    let mut config = ApiConfig::default();
    config.jwt = test_jwt_config();
    config
}

async fn seed_account(users: &Arc<InMemoryUserStore>, email: &str, role: &str) -> TestAccount {
    let hash = hash_password(TEST_PASSWORD).expect("hashing must succeed");
    let record = UserRecord::new(email, hash, vec![role.to_string()]);
    let account = TestAccount {
        user_id: record.id,
        email: email.to_string(),
    };
    users.insert(record).await.expect("seed account");
    account
}
