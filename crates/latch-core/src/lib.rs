// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-core
//!
//! Core abstractions and shared types for the LATCH task-tracking API.
//!
//! This crate provides the foundational pieces used across all LATCH
//! components:
//!
//! - **Types**: identifier newtypes (`UserId`, `TaskId`) and the user/task
//!   record types
//! - **Error**: unified error hierarchy with HTTP status mapping
//! - **Store**: async store seams (users, refresh tokens, tasks) with
//!   in-memory reference implementations
//! - **Audit**: security audit logging
//!
//! ## Example
//!
//! ```rust,ignore
//! use latch_core::store::{InMemoryRefreshTokenStore, RefreshTokenStore, hash_refresh_token};
//! use latch_core::types::UserId;
//! use chrono::{Duration, Utc};
//!
//! let store = InMemoryRefreshTokenStore::new();
//! let user = UserId::generate();
//! let digest = hash_refresh_token("raw-token");
//! store.create(user, &digest, Utc::now() + Duration::days(7)).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod store;
pub mod types;

// =============================================================================
// Enterprise Modules
// =============================================================================

pub mod audit;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::{AuthError, LatchError, StoreError, StoreResult};
pub use types::{TaskAttributes, TaskId, TaskRecord, UserId, UserRecord};

// Re-export store seams and reference implementations
pub use store::{
    hash_refresh_token, InMemoryRefreshTokenStore, InMemoryTaskStore, InMemoryUserStore,
    RefreshTokenRecord, RefreshTokenStore, RefreshValidation, TaskStore, UserStore,
};

// Re-export audit types
pub use audit::{
    ActionResult, AuditAction, AuditError, AuditFilter, AuditLog, AuditLogger, AuditSeverity,
    InMemoryAuditLogger, NoOpAuditLogger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
