// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission definitions for RBAC.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permissions for accessing API resources.
///
/// Permissions are fine-grained capability tokens assigned to roles. Each
/// guarded operation requires one or more permissions; the pipeline treats
/// their string forms as opaque comparison keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // =========================================================================
    // Task Permissions
    // =========================================================================
    /// Read tasks.
    TaskRead,
    /// Create new tasks.
    TaskCreate,
    /// Update task details.
    TaskUpdate,
    /// Delete tasks.
    TaskDelete,
    /// Assign and unassign tasks.
    TaskAssign,
    /// Toggle task completion.
    TaskComplete,

    // =========================================================================
    // User Permissions
    // =========================================================================
    /// Read user information.
    UserRead,
    /// Manage users (create, update, delete).
    UserAdmin,

    // =========================================================================
    // System Permissions
    // =========================================================================
    /// Full system administration.
    SystemAdmin,
}

impl Permission {
    /// Returns the permission name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::TaskRead => "read:tasks",
            Permission::TaskCreate => "create:tasks",
            Permission::TaskUpdate => "update:tasks",
            Permission::TaskDelete => "delete:tasks",
            Permission::TaskAssign => "assign:tasks",
            Permission::TaskComplete => "complete:tasks",
            Permission::UserRead => "read:users",
            Permission::UserAdmin => "admin:users",
            Permission::SystemAdmin => "admin:system",
        }
    }

    /// Parses a permission from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read:tasks" => Some(Permission::TaskRead),
            "create:tasks" => Some(Permission::TaskCreate),
            "update:tasks" => Some(Permission::TaskUpdate),
            "delete:tasks" => Some(Permission::TaskDelete),
            "assign:tasks" => Some(Permission::TaskAssign),
            "complete:tasks" => Some(Permission::TaskComplete),
            "read:users" => Some(Permission::UserRead),
            "admin:users" => Some(Permission::UserAdmin),
            "admin:system" => Some(Permission::SystemAdmin),
            _ => None,
        }
    }

    /// Returns all available permissions.
    pub fn all() -> &'static [Permission] {
        &[
            Permission::TaskRead,
            Permission::TaskCreate,
            Permission::TaskUpdate,
            Permission::TaskDelete,
            Permission::TaskAssign,
            Permission::TaskComplete,
            Permission::UserRead,
            Permission::UserAdmin,
            Permission::SystemAdmin,
        ]
    }

    /// Returns `true` if this is an admin-level permission.
    pub fn is_admin(&self) -> bool {
        matches!(self, Permission::UserAdmin | Permission::SystemAdmin)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// A set of permissions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: std::collections::HashSet<Permission>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a permission set from a list of permissions.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Creates a permission set from string forms, ignoring unknown tokens.
    ///
    /// Used when rebuilding the set from access-token claims; an unknown
    /// token cannot grant anything, so dropping it fails closed.
    pub fn from_strings<S: AsRef<str>>(strings: impl IntoIterator<Item = S>) -> Self {
        Self {
            permissions: strings
                .into_iter()
                .filter_map(|s| Permission::parse(s.as_ref()))
                .collect(),
        }
    }

    /// Returns the string forms of the contained permissions, sorted.
    pub fn to_strings(&self) -> Vec<String> {
        let mut strings: Vec<String> = self
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        strings.sort();
        strings
    }

    /// Adds a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Removes a permission from the set.
    pub fn remove(&mut self, permission: Permission) {
        self.permissions.remove(&permission);
    }

    /// Returns `true` if the set contains the given permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns `true` if the set contains all of the given permissions.
    pub fn contains_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.permissions.contains(p))
    }

    /// Returns `true` if the set contains any of the given permissions.
    pub fn contains_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.permissions.contains(p))
    }

    /// Returns the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Returns an iterator over the permissions.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Merges another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().copied());
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::from_permissions(iter)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_as_str() {
        assert_eq!(Permission::TaskRead.as_str(), "read:tasks");
        assert_eq!(Permission::TaskCreate.as_str(), "create:tasks");
        assert_eq!(Permission::SystemAdmin.as_str(), "admin:system");
    }

    #[test]
    fn test_permission_round_trip() {
        for permission in Permission::all() {
            assert_eq!(Permission::parse(permission.as_str()), Some(*permission));
        }
        assert_eq!(Permission::parse("invalid"), None);
    }

    #[test]
    fn test_permission_is_admin() {
        assert!(Permission::SystemAdmin.is_admin());
        assert!(Permission::UserAdmin.is_admin());
        assert!(!Permission::TaskRead.is_admin());
    }

    #[test]
    fn test_permission_set() {
        let mut set = PermissionSet::new();
        set.add(Permission::TaskRead);
        set.add(Permission::TaskCreate);

        assert!(set.contains(Permission::TaskRead));
        assert!(!set.contains(Permission::SystemAdmin));
        assert!(set.contains_all(&[Permission::TaskRead, Permission::TaskCreate]));
        assert!(!set.contains_all(&[Permission::TaskRead, Permission::TaskDelete]));
        assert!(set.contains_any(&[Permission::TaskDelete, Permission::TaskCreate]));
    }

    #[test]
    fn test_string_round_trip_drops_unknown() {
        let set = PermissionSet::from_permissions([Permission::TaskRead, Permission::TaskAssign]);
        let strings = set.to_strings();
        assert_eq!(strings, vec!["assign:tasks", "read:tasks"]);

        let mut with_noise = strings.clone();
        with_noise.push("made:up".to_string());
        let rebuilt = PermissionSet::from_strings(&with_noise);
        assert_eq!(rebuilt.len(), 2);
        assert!(rebuilt.contains(Permission::TaskRead));
    }
}
