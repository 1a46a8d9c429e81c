// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core audit log types.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{TaskId, UserId};

// =============================================================================
// Audit Log Entry
// =============================================================================

/// A single audit log entry.
///
/// Each entry captures one security-relevant event: an authentication
/// attempt, a token lifecycle transition or a guarded task mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique log entry ID.
    pub id: Uuid,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity level of the event.
    pub severity: AuditSeverity,

    /// User who performed the action (if known).
    pub user_id: Option<UserId>,

    /// Client IP address.
    pub client_ip: Option<IpAddr>,

    /// The action that was performed.
    pub action: AuditAction,

    /// Additional details about the action.
    pub details: serde_json::Value,

    /// The result of the action.
    pub result: ActionResult,

    /// Correlation ID for request tracing.
    pub correlation_id: Option<Uuid>,
}

impl AuditLog {
    /// Creates a new audit log entry.
    pub fn new(action: AuditAction, result: ActionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            severity: action.default_severity(),
            user_id: None,
            client_ip: None,
            action,
            details: serde_json::Value::Null,
            result,
            correlation_id: None,
        }
    }

    /// Sets the user information.
    pub fn with_user(mut self, user_id: UserId, client_ip: Option<IpAddr>) -> Self {
        self.user_id = Some(user_id);
        self.client_ip = client_ip;
        self
    }

    /// Sets the details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Sets the correlation ID.
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    // =========================================================================
    // Factory methods for common actions
    // =========================================================================

    /// Creates an audit log for a successful login.
    pub fn login(user_id: UserId, client_ip: Option<IpAddr>) -> Self {
        Self::new(AuditAction::Login, ActionResult::Success).with_user(user_id, client_ip)
    }

    /// Creates an audit log for a failed login attempt.
    ///
    /// Only the attempted email is recorded; the failure reason stays
    /// uniform so the log itself cannot become an enumeration oracle.
    pub fn login_failed(email: &str, client_ip: Option<IpAddr>) -> Self {
        let mut log = Self::new(
            AuditAction::Login,
            ActionResult::Failure {
                reason: "invalid credentials".to_string(),
            },
        )
        .with_details(serde_json::json!({ "email": email }))
        .with_severity(AuditSeverity::Warning);
        log.client_ip = client_ip;
        log
    }

    /// Creates an audit log for a logout.
    pub fn logout(user_id: UserId, client_ip: Option<IpAddr>) -> Self {
        Self::new(AuditAction::Logout, ActionResult::Success).with_user(user_id, client_ip)
    }

    /// Creates an audit log for a successful token rotation.
    pub fn token_refreshed(user_id: UserId, client_ip: Option<IpAddr>) -> Self {
        Self::new(AuditAction::TokenRefresh, ActionResult::Success).with_user(user_id, client_ip)
    }

    /// Creates an audit log for detected refresh-token reuse.
    ///
    /// This is the security event of the rotation design: a rotated token
    /// came back, so the whole session family has been revoked.
    pub fn token_reuse_detected(
        user_id: UserId,
        client_ip: Option<IpAddr>,
        revoked_count: usize,
    ) -> Self {
        Self::new(AuditAction::TokenReuseDetected, ActionResult::Denied)
            .with_user(user_id, client_ip)
            .with_details(serde_json::json!({ "revoked_records": revoked_count }))
            .with_severity(AuditSeverity::Critical)
    }

    /// Creates an audit log for a denied request.
    pub fn access_denied(
        user_id: UserId,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(AuditAction::PermissionDenied, ActionResult::Denied)
            .with_user(user_id, client_ip)
            .with_details(serde_json::json!({ "reason": reason.into() }))
            .with_severity(AuditSeverity::Warning)
    }

    /// Creates an audit log for a guarded task mutation.
    pub fn task_mutated(
        action: AuditAction,
        task_id: TaskId,
        user_id: UserId,
        client_ip: Option<IpAddr>,
    ) -> Self {
        Self::new(action, ActionResult::Success)
            .with_user(user_id, client_ip)
            .with_details(serde_json::json!({ "task_id": task_id.to_string() }))
    }
}

// =============================================================================
// Audit Action
// =============================================================================

/// Actions recorded by the audit subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A login attempt.
    Login,
    /// An explicit logout.
    Logout,
    /// A refresh-token rotation.
    TokenRefresh,
    /// A rotated refresh token was presented again.
    TokenReuseDetected,
    /// A request failed an authorization check.
    PermissionDenied,
    /// A task was created.
    TaskCreate,
    /// A task was updated.
    TaskUpdate,
    /// A task was deleted.
    TaskDelete,
    /// A task was assigned or unassigned.
    TaskAssign,
    /// A task's completion flag was toggled.
    TaskComplete,
}

impl AuditAction {
    /// Returns the default severity for this action.
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditAction::TokenReuseDetected => AuditSeverity::Critical,
            AuditAction::PermissionDenied => AuditSeverity::Warning,
            _ => AuditSeverity::Info,
        }
    }

    /// Returns the action name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::TokenRefresh => "token_refresh",
            AuditAction::TokenReuseDetected => "token_reuse_detected",
            AuditAction::PermissionDenied => "permission_denied",
            AuditAction::TaskCreate => "task_create",
            AuditAction::TaskUpdate => "task_update",
            AuditAction::TaskDelete => "task_delete",
            AuditAction::TaskAssign => "task_assign",
            AuditAction::TaskComplete => "task_complete",
        }
    }
}

// =============================================================================
// Action Result
// =============================================================================

/// The result of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ActionResult {
    /// The action succeeded.
    Success,
    /// The action failed.
    Failure {
        /// Failure reason (server-side only).
        reason: String,
    },
    /// The action was denied by an authorization check.
    Denied,
}

impl ActionResult {
    /// Returns `true` if the action succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }
}

// =============================================================================
// Audit Severity
// =============================================================================

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Normal operations.
    #[default]
    Info,
    /// Suspicious but non-fatal events.
    Warning,
    /// Security incidents requiring attention.
    Critical,
}

// =============================================================================
// Audit Filter
// =============================================================================

/// Filter for querying audit logs.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Match a specific action.
    pub action: Option<AuditAction>,
    /// Match a specific user.
    pub user_id: Option<UserId>,
    /// Only entries at or above this severity.
    pub min_severity: Option<AuditSeverity>,
    /// Only entries at or after this time.
    pub since: Option<DateTime<Utc>>,
}

impl AuditFilter {
    /// Creates an empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by action.
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Filters by user.
    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Filters by minimum severity.
    pub fn min_severity(mut self, severity: AuditSeverity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Filters by start time.
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Returns `true` if the entry matches this filter.
    pub fn matches(&self, entry: &AuditLog) -> bool {
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if entry.user_id != Some(user_id) {
                return false;
            }
        }
        if let Some(min) = self.min_severity {
            if entry.severity < min {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp < since {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
