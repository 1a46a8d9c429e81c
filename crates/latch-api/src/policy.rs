// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-operation authorization policy.
//!
//! One table declares, for every guarded task operation, the permission set
//! RBAC requires and the attribute check ABAC applies. The router derives
//! each route's RBAC middleware from this table and the handlers consult the
//! same table for the resource stage, so the declaration lives in exactly
//! one place.

use serde::{Deserialize, Serialize};

use latch_core::types::{TaskAttributes, UserId};
use latch_core::AuthError;

use crate::auth::abac::{self, AbacCheck};
use crate::auth::Permission;
use crate::middleware::RbacLayer;

// =============================================================================
// TaskOperation
// =============================================================================

/// The guarded operations of the task API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOperation {
    /// Create a new task.
    Create,
    /// List tasks.
    List,
    /// Fetch a single task.
    Get,
    /// Update a task's details.
    Update,
    /// Delete a task.
    Delete,
    /// Assign a task to a user.
    Assign,
    /// Remove a task's assignee.
    Unassign,
    /// Toggle a task's completion flag.
    ToggleComplete,
}

impl TaskOperation {
    /// Returns the operation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOperation::Create => "create",
            TaskOperation::List => "list",
            TaskOperation::Get => "get",
            TaskOperation::Update => "update",
            TaskOperation::Delete => "delete",
            TaskOperation::Assign => "assign",
            TaskOperation::Unassign => "unassign",
            TaskOperation::ToggleComplete => "toggle_complete",
        }
    }
}

// =============================================================================
// OperationPolicy
// =============================================================================

/// The declared requirements of one operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationPolicy {
    /// Permissions the caller's claims must all contain.
    pub required: &'static [Permission],
    /// Attribute check applied against the target task, if any.
    pub abac: Option<AbacCheck>,
}

/// Returns the policy for an operation.
pub fn for_operation(op: TaskOperation) -> OperationPolicy {
    match op {
        TaskOperation::Create => OperationPolicy {
            required: &[Permission::TaskCreate],
            abac: None,
        },
        TaskOperation::List | TaskOperation::Get => OperationPolicy {
            required: &[Permission::TaskRead],
            abac: None,
        },
        TaskOperation::Update => OperationPolicy {
            required: &[Permission::TaskUpdate],
            abac: Some(AbacCheck::OwnerOnly),
        },
        TaskOperation::Delete => OperationPolicy {
            required: &[Permission::TaskDelete],
            abac: Some(AbacCheck::OwnerOnly),
        },
        TaskOperation::Assign => OperationPolicy {
            required: &[Permission::TaskAssign],
            abac: Some(AbacCheck::RequiresUnassigned),
        },
        TaskOperation::Unassign => OperationPolicy {
            required: &[Permission::TaskAssign],
            abac: Some(AbacCheck::RequiresAssigned),
        },
        TaskOperation::ToggleComplete => OperationPolicy {
            required: &[Permission::TaskComplete],
            abac: Some(AbacCheck::AssigneeOnly),
        },
    }
}

/// Builds the RBAC middleware layer for an operation from the table.
pub fn rbac_layer(op: TaskOperation) -> RbacLayer {
    RbacLayer::require_all(for_operation(op).required.to_vec())
}

/// Applies the operation's attribute check, if it declares one.
///
/// The caller must have resolved the task's attributes already; resource
/// existence is checked before this stage runs.
pub fn enforce_abac(
    op: TaskOperation,
    requester: UserId,
    attrs: &TaskAttributes,
) -> Result<(), AuthError> {
    match for_operation(op).abac {
        Some(check) => abac::enforce(check, requester, attrs),
        None => Ok(()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_operation() {
        for op in [
            TaskOperation::Create,
            TaskOperation::List,
            TaskOperation::Get,
            TaskOperation::Update,
            TaskOperation::Delete,
            TaskOperation::Assign,
            TaskOperation::Unassign,
            TaskOperation::ToggleComplete,
        ] {
            assert!(
                !for_operation(op).required.is_empty(),
                "operation {} must require at least one permission",
                op.as_str()
            );
        }
    }

    #[test]
    fn test_mutating_operations_declare_abac() {
        assert_eq!(
            for_operation(TaskOperation::Update).abac,
            Some(AbacCheck::OwnerOnly)
        );
        assert_eq!(
            for_operation(TaskOperation::Delete).abac,
            Some(AbacCheck::OwnerOnly)
        );
        assert_eq!(
            for_operation(TaskOperation::Assign).abac,
            Some(AbacCheck::RequiresUnassigned)
        );
        assert_eq!(
            for_operation(TaskOperation::Unassign).abac,
            Some(AbacCheck::RequiresAssigned)
        );
        assert_eq!(
            for_operation(TaskOperation::ToggleComplete).abac,
            Some(AbacCheck::AssigneeOnly)
        );
    }

    #[test]
    fn test_read_operations_skip_abac() {
        assert!(for_operation(TaskOperation::List).abac.is_none());
        assert!(for_operation(TaskOperation::Get).abac.is_none());
        assert!(for_operation(TaskOperation::Create).abac.is_none());
    }

    #[test]
    fn test_enforce_abac_noop_without_declaration() {
        let attrs = TaskAttributes {
            creator_id: UserId::generate(),
            assigned_user_id: None,
            is_completed: false,
        };
        // No check declared for Create, so any requester passes.
        assert!(enforce_abac(TaskOperation::Create, UserId::generate(), &attrs).is_ok());
    }

    #[test]
    fn test_enforce_abac_applies_declared_check() {
        let owner = UserId::generate();
        let attrs = TaskAttributes {
            creator_id: owner,
            assigned_user_id: None,
            is_completed: false,
        };

        assert!(enforce_abac(TaskOperation::Update, owner, &attrs).is_ok());
        assert_eq!(
            enforce_abac(TaskOperation::Update, UserId::generate(), &attrs),
            Err(AuthError::NotResourceOwner)
        );
    }
}
