// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! This module provides the command-line interface for LATCH using clap:
//!
//! - `run`: Start the API server (default)
//! - `version`: Show version information

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// LATCH - task tracking with a hardened auth core
#[derive(Parser, Debug)]
#[command(
    name = "latch",
    author = "Sylvex <contact@sylvex.io>",
    version = latch_core::VERSION,
    about = "LATCH task-tracking API server",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "LATCH_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "LATCH_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the LATCH CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Host address to bind
    #[arg(long, default_value = "0.0.0.0", env = "LATCH_HOST")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, default_value_t = 8080, env = "LATCH_PORT")]
    pub port: u16,

    /// Secret for signing access tokens
    #[arg(long, env = "LATCH_ACCESS_SECRET", hide_env_values = true)]
    pub access_secret: Option<String>,

    /// Secret for signing refresh tokens
    #[arg(long, env = "LATCH_REFRESH_SECRET", hide_env_values = true)]
    pub refresh_secret: Option<String>,

    /// Seed demo accounts (viewer/editor/manager/admin) at startup
    #[arg(long, env = "LATCH_SEED_DEMO_USERS")]
    pub seed_demo_users: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            access_secret: std::env::var("LATCH_ACCESS_SECRET").ok(),
            refresh_secret: std::env::var("LATCH_REFRESH_SECRET").ok(),
            seed_demo_users: false,
        }
    }
}

// =============================================================================
// Log Format
// =============================================================================

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text output.
    Text,
    /// Structured JSON output for log aggregation.
    Json,
    /// Minimal, compact output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================
