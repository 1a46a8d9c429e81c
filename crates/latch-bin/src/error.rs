// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Binary-level error types.

use thiserror::Error;

/// Errors surfaced by the binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration is invalid or incomplete.
    #[error("Configuration error: {message}")]
    Config {
        /// Diagnostic message.
        message: String,
    },

    /// The API layer failed.
    #[error("API error: {0}")]
    Api(#[from] latch_api::ApiError),

    /// A store seam failed during startup.
    #[error("Store error: {0}")]
    Store(#[from] latch_core::StoreError),

    /// I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for binary operations.
pub type BinResult<T> = Result<T, BinError>;
