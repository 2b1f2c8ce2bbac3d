//! Role → permission map
//!
//! A role with no configured entry grants nothing. That is a valid state,
//! not an error.

use crate::types::{Permission, PermissionSet, Role};
use serde::Serialize;
use std::collections::HashMap;

/// Display information for a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleProfile {
    /// Short display label (e.g. "Administrator")
    pub label: String,

    /// One-line description of what the role is for
    pub description: String,
}

impl RoleProfile {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Mapping from each role to the permissions it holds
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    grants: HashMap<Role, PermissionSet>,
    profiles: HashMap<Role, RoleProfile>,
    empty: PermissionSet,
}

impl RoleMap {
    /// Create an empty map (every role grants nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the permissions held by a role, replacing any previous entry
    pub fn with_role(mut self, role: Role, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.grant(role, permissions.into_iter().collect());
        self
    }

    /// Set the display profile of a role
    pub fn with_profile(mut self, role: Role, profile: RoleProfile) -> Self {
        self.profiles.insert(role, profile);
        self
    }

    pub(crate) fn grant(&mut self, role: Role, permissions: PermissionSet) {
        self.grants.insert(role, permissions);
    }

    pub(crate) fn set_profile(&mut self, role: Role, profile: RoleProfile) {
        self.profiles.insert(role, profile);
    }

    /// Permissions held by `role`; the empty set when it has no entry
    pub fn permissions_of(&self, role: Role) -> &PermissionSet {
        self.grants.get(&role).unwrap_or(&self.empty)
    }

    pub(crate) fn empty_set(&self) -> &PermissionSet {
        &self.empty
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.permissions_of(role).contains(permission)
    }

    /// Whether the role has an explicit entry (possibly empty)
    pub fn is_configured(&self, role: Role) -> bool {
        self.grants.contains_key(&role)
    }

    pub fn profile(&self, role: Role) -> Option<&RoleProfile> {
        self.profiles.get(&role)
    }

    /// Display label for a raw role key, or the key itself when unknown
    pub fn label_or_key<'a>(&'a self, key: &'a str) -> &'a str {
        Role::parse(key)
            .and_then(|r| self.profiles.get(&r))
            .map(|p| p.label.as_str())
            .unwrap_or(key)
    }

    /// Description for a raw role key, or the key itself when unknown
    pub fn description_or_key<'a>(&'a self, key: &'a str) -> &'a str {
        Role::parse(key)
            .and_then(|r| self.profiles.get(&r))
            .map(|p| p.description.as_str())
            .unwrap_or(key)
    }

    /// Every role of the closed set with its permissions, in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (Role, &PermissionSet)> + '_ {
        Role::all().iter().map(move |r| (*r, self.permissions_of(*r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_role_grants_nothing() {
        let map = RoleMap::new().with_role(Role::Cashier, [Permission::CreateSale]);

        assert!(map.permissions_of(Role::Accountant).is_empty());
        assert!(!map.is_configured(Role::Accountant));
        assert!(!map.has_permission(Role::Accountant, Permission::CreateSale));
    }

    #[test]
    fn test_configured_but_empty_role() {
        let map = RoleMap::new().with_role(Role::Accountant, Vec::<Permission>::new());

        assert!(map.is_configured(Role::Accountant));
        assert!(map.permissions_of(Role::Accountant).is_empty());
    }

    #[test]
    fn test_with_role_replaces_previous_entry() {
        let map = RoleMap::new()
            .with_role(Role::Manager, [Permission::ViewStock])
            .with_role(Role::Manager, [Permission::ManageStock]);

        assert!(!map.has_permission(Role::Manager, Permission::ViewStock));
        assert!(map.has_permission(Role::Manager, Permission::ManageStock));
    }

    #[test]
    fn test_profile_fallbacks() {
        let map = RoleMap::new().with_profile(
            Role::Admin,
            RoleProfile::new("Administrator", "Full access"),
        );

        assert_eq!(map.label_or_key("admin"), "Administrator");
        assert_eq!(map.description_or_key("ADMIN"), "Full access");
        assert_eq!(map.label_or_key("cashier"), "cashier");
        assert_eq!(map.label_or_key("ghost"), "ghost");
    }

    #[test]
    fn test_entries_cover_closed_role_set() {
        let map = RoleMap::new().with_role(Role::Admin, [Permission::ViewUsers]);
        let roles: Vec<Role> = map.entries().map(|(r, _)| r).collect();

        assert_eq!(roles, Role::all().to_vec());
    }
}
