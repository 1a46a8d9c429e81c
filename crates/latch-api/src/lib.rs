// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-api
//!
//! REST API server for the LATCH task tracker.
//!
//! This crate provides the HTTP server with JWT authentication, refresh
//! rotation with reuse detection, and the layered RBAC/ABAC authorization
//! pipeline every protected request passes through.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod response;
pub mod server;
pub mod state;

// Re-exports for convenience
pub use auth::{
    AbacCheck, AuthContext, Claims, JwtConfig, Permission, RbacPolicy, RefreshCoalescer, Role,
    SessionManager, TokenCodec, TokenKind, TokenPair,
};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use policy::{OperationPolicy, TaskOperation};
pub use response::{ApiResponse, AuthResponse, HealthResponse};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
