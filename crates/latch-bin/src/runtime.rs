// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! This module wires the components together in dependency order:
//! configuration, stores, RBAC policy, token codec, session manager, API
//! server; then runs until shutdown is signaled.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{info, warn};

use latch_api::{ApiConfig, ApiServerBuilder, JwtConfig};
use latch_core::audit::InMemoryAuditLogger;
use latch_core::store::{InMemoryUserStore, UserStore};
use latch_core::types::UserRecord;

use crate::cli::RunArgs;
use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServerRuntime
// =============================================================================

/// The main runtime that builds and runs the API server.
pub struct ServerRuntime {
    config: ApiConfig,
    seed_demo_users: bool,
    shutdown: ShutdownCoordinator,
}

impl ServerRuntime {
    /// Creates a runtime from CLI arguments.
    pub fn from_args(args: &RunArgs) -> BinResult<Self> {
        let host: IpAddr = args
            .host
            .parse()
            .map_err(|_| BinError::config(format!("Invalid host address: {}", args.host)))?;

        let access_secret = args
            .access_secret
            .clone()
            .ok_or_else(|| BinError::config("LATCH_ACCESS_SECRET is required"))?;
        let refresh_secret = args
            .refresh_secret
            .clone()
            .ok_or_else(|| BinError::config("LATCH_REFRESH_SECRET is required"))?;

        let config = ApiConfig::default()
            .with_host(host)
            .with_port(args.port)
            .with_jwt(JwtConfig::new(access_secret, refresh_secret));

        Ok(Self {
            config,
            seed_demo_users: args.seed_demo_users,
            shutdown: ShutdownCoordinator::new(),
        })
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting LATCH v{}", latch_core::VERSION);

        let users = InMemoryUserStore::shared();
        if self.seed_demo_users {
            seed_demo_users(&users).await?;
        }

        let audit_logger: Arc<dyn latch_core::audit::AuditLogger> = if self.config.audit_enabled {
            Arc::new(InMemoryAuditLogger::new())
        } else {
            Arc::new(latch_core::audit::NoOpAuditLogger)
        };

        let server = ApiServerBuilder::new()
            .config(self.config)
            .users(users)
            .audit_logger(audit_logger)
            .build()?;

        self.shutdown.listen_for_signals();
        let signal = self.shutdown.signal();

        server.run_with_shutdown(signal).await?;

        info!("LATCH shutdown complete");
        Ok(())
    }
}

// =============================================================================
// Demo Seeding
// =============================================================================

/// Seeds one account per default role. Development convenience only.
async fn seed_demo_users(users: &Arc<InMemoryUserStore>) -> BinResult<()> {
    warn!("Seeding demo accounts; do not enable this in production");

    let accounts = [
        ("viewer@latch.dev", "viewer-password", "viewer"),
        ("editor@latch.dev", "editor-password", "editor"),
        ("manager@latch.dev", "manager-password", "manager"),
        ("admin@latch.dev", "admin-password", "admin"),
    ];

    for (email, password, role) in accounts {
        let hash = latch_api::auth::hash_password(password)?;
        users
            .insert(UserRecord::new(email, hash, vec![role.to_string()]))
            .await?;
        info!(email = email, role = role, "Seeded demo account");
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args() -> RunArgs {
        RunArgs {
            host: "127.0.0.1".to_string(),
            port: 0,
            access_secret: Some("access-secret-key-that-is-long-enough-for-tests".to_string()),
            refresh_secret: Some("refresh-secret-key-that-is-long-enough-for-tests".to_string()),
            seed_demo_users: false,
        }
    }

    #[test]
    fn test_runtime_from_args() {
        let runtime = ServerRuntime::from_args(&run_args()).unwrap();
        assert_eq!(runtime.config.port, 0);
    }

    #[test]
    fn test_runtime_requires_secrets() {
        let mut args = run_args();
        args.access_secret = None;
        assert!(ServerRuntime::from_args(&args).is_err());
    }

    #[test]
    fn test_runtime_rejects_bad_host() {
        let mut args = run_args();
        args.host = "not-an-ip".to_string();
        assert!(ServerRuntime::from_args(&args).is_err());
    }

    #[tokio::test]
    async fn test_seed_demo_users() {
        let users = InMemoryUserStore::shared();
        seed_demo_users(&users).await.unwrap();

        let admin = users.find_by_email("admin@latch.dev").await.unwrap();
        assert!(admin.is_some());
        assert_eq!(admin.unwrap().roles, vec!["admin".to_string()]);
    }
}
