// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role-Based Access Control (RBAC).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::permission::PermissionSet;
use super::Permission;

// =============================================================================
// Role
// =============================================================================

/// Predefined roles.
///
/// Roles are seed data: the mapping is built once at startup and is not
/// mutable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access to tasks.
    Viewer,
    /// Can create and work tasks.
    Editor,
    /// Editor plus deletion and user visibility.
    Manager,
    /// Complete system access.
    Admin,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" | "reader" => Some(Role::Viewer),
            "editor" | "member" => Some(Role::Editor),
            "manager" => Some(Role::Manager),
            "admin" | "administrator" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Returns the default permissions for this role.
    pub fn default_permissions(&self) -> Vec<Permission> {
        match self {
            Role::Viewer => vec![Permission::TaskRead],
            Role::Editor => vec![
                Permission::TaskRead,
                Permission::TaskCreate,
                Permission::TaskUpdate,
                Permission::TaskAssign,
                Permission::TaskComplete,
            ],
            Role::Manager => vec![
                Permission::TaskRead,
                Permission::TaskCreate,
                Permission::TaskUpdate,
                Permission::TaskDelete,
                Permission::TaskAssign,
                Permission::TaskComplete,
                Permission::UserRead,
            ],
            Role::Admin => Permission::all().to_vec(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// RBAC Policy
// =============================================================================

/// The role-to-permission authorization graph.
///
/// This is the Permission Resolver's data source. It is only consulted at
/// login and refresh time; the resolved set is embedded into access-token
/// claims, so the request hot path never touches this map. The trade-off is
/// a staleness window bounded by the access-token TTL: permission changes
/// take effect at the holder's next refresh.
#[derive(Debug, Clone)]
pub struct RbacPolicy {
    role_permissions: Arc<HashMap<String, PermissionSet>>,
}

impl RbacPolicy {
    /// Creates a new RBAC policy with the default roles.
    pub fn new() -> Self {
        let mut role_permissions = HashMap::new();

        for role in &[Role::Viewer, Role::Editor, Role::Manager, Role::Admin] {
            let perms = PermissionSet::from_permissions(role.default_permissions());
            role_permissions.insert(role.as_str().to_string(), perms);
        }

        Self {
            role_permissions: Arc::new(role_permissions),
        }
    }

    /// Creates a policy builder.
    pub fn builder() -> RbacPolicyBuilder {
        RbacPolicyBuilder::new()
    }

    /// Returns the permissions granted to a single role.
    pub fn get_permissions(&self, role: &str) -> Option<&PermissionSet> {
        self.role_permissions.get(role)
    }

    /// Resolves the de-duplicated permission set for a user's roles.
    ///
    /// Unknown role names contribute nothing.
    pub fn permissions_for(&self, roles: &[String]) -> PermissionSet {
        let mut combined = PermissionSet::new();

        for role in roles {
            if let Some(perms) = self.role_permissions.get(role) {
                combined.merge(perms);
            }
        }

        combined
    }

    /// Returns `true` if the given roles grant the specified permission.
    pub fn has_permission(&self, roles: &[String], permission: Permission) -> bool {
        roles.iter().any(|role| {
            self.role_permissions
                .get(role)
                .is_some_and(|perms| perms.contains(permission))
        })
    }

    /// Returns all registered role names.
    pub fn roles(&self) -> Vec<&str> {
        self.role_permissions.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for RbacPolicy {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RBAC Policy Builder
// =============================================================================

/// Builder for constructing RBAC policies.
#[derive(Debug, Default)]
pub struct RbacPolicyBuilder {
    role_permissions: HashMap<String, PermissionSet>,
}

impl RbacPolicyBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the default roles with their standard permissions.
    pub fn with_default_roles(mut self) -> Self {
        for role in &[Role::Viewer, Role::Editor, Role::Manager, Role::Admin] {
            let perms = PermissionSet::from_permissions(role.default_permissions());
            self.role_permissions.insert(role.as_str().to_string(), perms);
        }
        self
    }

    /// Adds a role with specific permissions.
    pub fn add_role(mut self, role: impl Into<String>, permissions: Vec<Permission>) -> Self {
        let perms = PermissionSet::from_permissions(permissions);
        self.role_permissions.insert(role.into(), perms);
        self
    }

    /// Builds the policy.
    pub fn build(self) -> RbacPolicy {
        RbacPolicy {
            role_permissions: Arc::new(self.role_permissions),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_default_permissions() {
        let viewer = Role::Viewer.default_permissions();
        assert!(viewer.contains(&Permission::TaskRead));
        assert!(!viewer.contains(&Permission::TaskCreate));

        let admin = Role::Admin.default_permissions();
        assert!(admin.contains(&Permission::SystemAdmin));
    }

    #[test]
    fn test_policy_default_roles() {
        let policy = RbacPolicy::new();

        assert!(policy.has_permission(&["viewer".to_string()], Permission::TaskRead));
        assert!(!policy.has_permission(&["viewer".to_string()], Permission::TaskCreate));
        assert!(policy.has_permission(&["editor".to_string()], Permission::TaskCreate));
        assert!(!policy.has_permission(&["editor".to_string()], Permission::TaskDelete));
        assert!(policy.has_permission(&["manager".to_string()], Permission::TaskDelete));
    }

    #[test]
    fn test_permissions_for_deduplicates() {
        let policy = RbacPolicy::new();

        let combined =
            policy.permissions_for(&["viewer".to_string(), "editor".to_string()]);

        // Viewer's read:tasks overlaps editor's; the set holds it once.
        assert!(combined.contains(Permission::TaskRead));
        assert!(combined.contains(Permission::TaskCreate));
        assert_eq!(combined.len(), Role::Editor.default_permissions().len());
    }

    #[test]
    fn test_unknown_role_grants_nothing() {
        let policy = RbacPolicy::new();
        let combined = policy.permissions_for(&["ghost".to_string()]);
        assert!(combined.is_empty());
        assert!(!policy.has_permission(&[], Permission::TaskRead));
    }

    #[test]
    fn test_policy_builder() {
        let policy = RbacPolicy::builder()
            .with_default_roles()
            .add_role("auditor", vec![Permission::TaskRead, Permission::UserRead])
            .build();

        assert!(policy.has_permission(&["auditor".to_string()], Permission::UserRead));
        assert!(!policy.has_permission(&["auditor".to_string()], Permission::TaskUpdate));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("EDITOR"), Some(Role::Editor));
        assert_eq!(Role::parse("administrator"), Some(Role::Admin));
        assert_eq!(Role::parse("unknown"), None);
    }
}
