// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit logging for security events.
//!
//! Every consequential auth event flows through this subsystem: logins and
//! their failures, token rotations, refresh-token reuse detection and denied
//! requests. The logger seam is async-first and pluggable so deployments can
//! route entries to their SIEM of choice.
//!
//! # Components
//!
//! - [`AuditLogger`]: core trait for logger implementations
//! - [`AuditLog`]: structured audit entry with factory constructors
//! - [`InMemoryAuditLogger`]: queryable logger for tests and development
//! - [`NoOpAuditLogger`]: discards everything; used when auditing is off

mod error;
mod memory_logger;
mod types;

pub use error::{AuditError, AuditResult};
pub use memory_logger::InMemoryAuditLogger;
pub use types::{ActionResult, AuditAction, AuditFilter, AuditLog, AuditSeverity};

use async_trait::async_trait;

// =============================================================================
// Core Trait
// =============================================================================

/// Trait for audit logger implementations.
///
/// Implementations should be non-blocking where possible; the auth hot path
/// awaits these calls.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Logs an audit entry.
    async fn log(&self, entry: AuditLog) -> AuditResult<()>;

    /// Queries audit logs with the given filter.
    ///
    /// Not all implementations support querying; those that do not may
    /// return [`AuditError::Unsupported`].
    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditLog>>;

    /// Flushes any buffered entries. Call before shutdown.
    async fn flush(&self) -> AuditResult<()>;

    /// Returns the logger name for identification.
    fn name(&self) -> &str {
        "audit_logger"
    }

    /// Returns `true` if this logger supports querying.
    fn supports_query(&self) -> bool {
        false
    }
}

// =============================================================================
// No-Op Logger
// =============================================================================

/// A no-op audit logger that discards all entries.
///
/// Used when audit logging is disabled.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

impl NoOpAuditLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _entry: AuditLog) -> AuditResult<()> {
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        Ok(Vec::new())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
