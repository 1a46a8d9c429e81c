// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # latch-bin
//!
//! CLI binary for the LATCH task-tracking API server.
//!
//! This crate provides the main binary entry point, including:
//!
//! - CLI argument parsing with clap
//! - Server runtime orchestration
//! - Graceful shutdown handling
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! latch run --port 8080
//!
//! # Secrets come from the environment
//! LATCH_ACCESS_SECRET=... LATCH_REFRESH_SECRET=... latch run
//!
//! # Show version
//! latch version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands, LogFormat, RunArgs};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::ServerRuntime;
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
