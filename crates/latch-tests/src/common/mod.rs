// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! Shared fixtures and helpers for integration tests.
//!
//! ## Module Structure
//!
//! - `fixtures`: seeded application environments and test accounts
//! - `harness`: request helpers over the router

pub mod fixtures;
pub mod harness;

// Re-exports for convenience
pub use fixtures::*;
pub use harness::*;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call at the start of each test module.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,latch=debug")),
            )
            .with_test_writer()
            .init();
    });
}
