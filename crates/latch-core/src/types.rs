// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for LATCH.
//!
//! This module provides the identifier newtypes and record types shared by
//! the API, the store seams and the test suites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a user (principal).
///
/// User IDs are opaque UUIDs; they are stable for the lifetime of the account
/// and appear as the `sub` claim of issued tokens.
///
/// # Examples
///
/// ```
/// use latch_core::types::UserId;
///
/// let id = UserId::generate();
/// assert_eq!(id, UserId::parse(&id.to_string()).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a user ID from an existing UUID.
    #[inline]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh, time-ordered user ID.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses a user ID from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Returns the inner UUID.
    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a task ID from an existing UUID.
    #[inline]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh, time-ordered task ID.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses a task ID from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Returns the inner UUID.
    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TaskId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// =============================================================================
// User Record
// =============================================================================

/// A stored user account.
///
/// The password hash is an opaque PHC string owned by the credential
/// verifier; it never leaves the store layer in serialized form.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user ID.
    pub id: UserId,
    /// Unique email address (login name).
    pub email: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Role names assigned to this user.
    pub roles: Vec<String>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new user record with a generated ID.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            password_hash: password_hash.into(),
            roles,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Task Records
// =============================================================================

/// The minimal attribute view of a task required by attribute-based checks.
///
/// Guards compare the requester against these fields; the full task body is
/// not needed for an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAttributes {
    /// The user who created the task.
    pub creator_id: UserId,
    /// The user currently assigned, if any.
    pub assigned_user_id: Option<UserId>,
    /// Whether the task has been completed.
    pub is_completed: bool,
}

impl TaskAttributes {
    /// Returns `true` if the task currently has an assignee.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.assigned_user_id.is_some()
    }
}

/// A stored task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique task ID.
    pub id: TaskId,
    /// Short human-readable title.
    pub title: String,
    /// Optional free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Authorization-relevant attributes.
    #[serde(flatten)]
    pub attributes: TaskAttributes,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Creates a new, unassigned, incomplete task.
    pub fn new(creator_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::generate(),
            title: title.into(),
            description: None,
            attributes: TaskAttributes {
                creator_id,
                assigned_user_id: None,
                is_completed: false,
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::generate();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_user_id_parse_rejects_garbage() {
        assert!(UserId::parse("not-a-uuid").is_none());
    }

    #[test]
    fn test_task_record_defaults() {
        let creator = UserId::generate();
        let task = TaskRecord::new(creator, "write release notes");

        assert_eq!(task.attributes.creator_id, creator);
        assert!(!task.attributes.is_assigned());
        assert!(!task.attributes.is_completed);
    }

    #[test]
    fn test_task_attributes_serde() {
        let attrs = TaskAttributes {
            creator_id: UserId::generate(),
            assigned_user_id: None,
            is_completed: false,
        };

        let json = serde_json::to_string(&attrs).unwrap();
        let back: TaskAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(attrs, back);
    }
}
