// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit subsystem errors.

use thiserror::Error;

/// Errors produced by audit loggers.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The logger backend failed to persist an entry.
    #[error("failed to write audit entry: {message}")]
    WriteFailed {
        /// Diagnostic message.
        message: String,
    },

    /// The logger does not support the requested operation.
    #[error("operation not supported by '{logger}'")]
    Unsupported {
        /// Logger name.
        logger: String,
    },
}

impl AuditError {
    /// Creates a `WriteFailed` error.
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }

    /// Creates an `Unsupported` error.
    pub fn unsupported(logger: impl Into<String>) -> Self {
        Self::Unsupported {
            logger: logger.into(),
        }
    }
}

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
