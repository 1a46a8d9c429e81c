// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! The authorization pipeline is an ordered chain of short-circuiting
//! stages:
//!
//! 1. [`AuthMiddleware`]: bearer-token authentication (401 on failure)
//! 2. [`RbacLayer`]: declared-permission check (403 on failure)
//! 3. ABAC runs in the handlers once the resource is resolved; see
//!    `crate::policy`

mod auth;
mod rbac;

pub use auth::{AuthLayer, AuthMiddleware};
pub use rbac::RbacLayer;
