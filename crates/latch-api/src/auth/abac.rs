// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Attribute-Based Access Control (ABAC) checks.
//!
//! These are the resource-dependent guard predicates of the pipeline: pure
//! comparisons of the requester against the task's attributes, no IO. The
//! caller is responsible for resolving the attributes first (and for the
//! existence check that precedes any of these comparisons).

use serde::{Deserialize, Serialize};

use latch_core::types::{TaskAttributes, UserId};
use latch_core::AuthError;

// =============================================================================
// AbacCheck
// =============================================================================

/// The attribute checks an operation can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbacCheck {
    /// The requester must be the task's creator.
    OwnerOnly,
    /// The task must currently be unassigned.
    RequiresUnassigned,
    /// The task must currently be assigned.
    RequiresAssigned,
    /// The requester must be the task's current assignee.
    AssigneeOnly,
}

impl AbacCheck {
    /// Returns the check name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AbacCheck::OwnerOnly => "owner_only",
            AbacCheck::RequiresUnassigned => "requires_unassigned",
            AbacCheck::RequiresAssigned => "requires_assigned",
            AbacCheck::AssigneeOnly => "assignee_only",
        }
    }
}

// =============================================================================
// Enforcement
// =============================================================================

/// Evaluates one attribute check against a task's attributes.
///
/// All violations are authorization failures (403 family), never conflicts:
/// the wrong-assignment-state case deliberately maps to the same status as
/// an ownership violation so the response reveals nothing beyond what RBAC
/// already exposed.
pub fn enforce(
    check: AbacCheck,
    requester: UserId,
    attrs: &TaskAttributes,
) -> Result<(), AuthError> {
    match check {
        AbacCheck::OwnerOnly => {
            if attrs.creator_id == requester {
                Ok(())
            } else {
                Err(AuthError::NotResourceOwner)
            }
        }
        AbacCheck::RequiresUnassigned => {
            if attrs.is_assigned() {
                Err(AuthError::InvalidAssignmentState)
            } else {
                Ok(())
            }
        }
        AbacCheck::RequiresAssigned => {
            if attrs.is_assigned() {
                Ok(())
            } else {
                Err(AuthError::InvalidAssignmentState)
            }
        }
        AbacCheck::AssigneeOnly => match attrs.assigned_user_id {
            Some(assignee) if assignee == requester => Ok(()),
            _ => Err(AuthError::NotAssignee),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(creator: UserId, assignee: Option<UserId>) -> TaskAttributes {
        TaskAttributes {
            creator_id: creator,
            assigned_user_id: assignee,
            is_completed: false,
        }
    }

    #[test]
    fn test_owner_only() {
        let owner = UserId::generate();
        let other = UserId::generate();
        let task = attrs(owner, None);

        assert!(enforce(AbacCheck::OwnerOnly, owner, &task).is_ok());
        assert_eq!(
            enforce(AbacCheck::OwnerOnly, other, &task),
            Err(AuthError::NotResourceOwner)
        );
    }

    #[test]
    fn test_requires_unassigned() {
        let user = UserId::generate();
        let free = attrs(user, None);
        let taken = attrs(user, Some(UserId::generate()));

        assert!(enforce(AbacCheck::RequiresUnassigned, user, &free).is_ok());
        assert_eq!(
            enforce(AbacCheck::RequiresUnassigned, user, &taken),
            Err(AuthError::InvalidAssignmentState)
        );
    }

    #[test]
    fn test_requires_assigned() {
        let user = UserId::generate();
        let free = attrs(user, None);
        let taken = attrs(user, Some(UserId::generate()));

        assert!(enforce(AbacCheck::RequiresAssigned, user, &taken).is_ok());
        assert_eq!(
            enforce(AbacCheck::RequiresAssigned, user, &free),
            Err(AuthError::InvalidAssignmentState)
        );
    }

    #[test]
    fn test_assignee_only() {
        let assignee = UserId::generate();
        let other = UserId::generate();
        let task = attrs(other, Some(assignee));

        assert!(enforce(AbacCheck::AssigneeOnly, assignee, &task).is_ok());
        assert_eq!(
            enforce(AbacCheck::AssigneeOnly, other, &task),
            Err(AuthError::NotAssignee)
        );

        // An unassigned task has no assignee to match.
        let free = attrs(other, None);
        assert_eq!(
            enforce(AbacCheck::AssigneeOnly, assignee, &free),
            Err(AuthError::NotAssignee)
        );
    }

    #[test]
    fn test_state_violations_share_the_owner_status() {
        // Both must surface as 403 to the client.
        assert_eq!(AuthError::InvalidAssignmentState.status_code(), 403);
        assert_eq!(AuthError::NotResourceOwner.status_code(), 403);
    }
}
