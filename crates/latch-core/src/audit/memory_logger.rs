// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory audit logger for testing and development.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::AuditResult;
use super::types::{AuditFilter, AuditLog};
use super::AuditLogger;

// =============================================================================
// In-Memory Audit Logger
// =============================================================================

/// In-memory audit logger.
///
/// Stores all audit entries in memory, supporting both logging and querying.
/// Primarily intended for tests; also useful while developing.
///
/// # Thread Safety
///
/// Entries are stored in an `RwLock`-protected vector; the logger is cheap
/// to clone and safe to share across tasks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogger {
    logs: Arc<RwLock<Vec<AuditLog>>>,
}

impl InMemoryAuditLogger {
    /// Creates a new in-memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger wrapped for shared use.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns all logged entries.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().clone()
    }

    /// Returns entries matching a predicate.
    pub fn entries_where<F>(&self, predicate: F) -> Vec<AuditLog>
    where
        F: Fn(&AuditLog) -> bool,
    {
        self.logs
            .read()
            .iter()
            .filter(|l| predicate(l))
            .cloned()
            .collect()
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.logs.write().clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns `true` if no entries have been logged.
    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        self.logs.write().push(entry);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        Ok(self
            .logs
            .read()
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn supports_query(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::AuditAction;
    use crate::types::UserId;

    #[tokio::test]
    async fn test_log_and_query() {
        let logger = InMemoryAuditLogger::new();
        let user = UserId::generate();

        logger.log(AuditLog::login(user, None)).await.unwrap();
        logger.log(AuditLog::logout(user, None)).await.unwrap();
        logger
            .log(AuditLog::login_failed("x@example.com", None))
            .await
            .unwrap();

        assert_eq!(logger.len(), 3);

        let logins = logger
            .query(AuditFilter::new().action(AuditAction::Login))
            .await
            .unwrap();
        assert_eq!(logins.len(), 2);

        let for_user = logger.query(AuditFilter::new().user(user)).await.unwrap();
        assert_eq!(for_user.len(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let logger = InMemoryAuditLogger::new();
        logger
            .log(AuditLog::login(UserId::generate(), None))
            .await
            .unwrap();
        assert!(!logger.is_empty());

        logger.clear();
        assert!(logger.is_empty());
    }
}
