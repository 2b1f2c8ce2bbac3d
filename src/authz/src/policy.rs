//! Access policy: catalog, role map and route guards as one immutable object
//!
//! An [`AccessPolicy`] is assembled once at startup, validated, and then
//! shared (usually behind an `Arc`) with everything that needs decisions.
//! Nothing mutates it afterwards.

pub mod builtin;
pub mod document;

pub use document::{CategoryDocument, PermissionDocument, PolicyDocument, RoleDocument};

use crate::catalog::{CategoryGroup, PermissionCatalog, PermissionRecord};
use crate::error::{AuthzError, Result};
use crate::roles::RoleMap;
use crate::routes::RouteGuardTable;
use crate::types::Role;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Validated authorization tables
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    catalog: PermissionCatalog,
    roles: RoleMap,
    routes: RouteGuardTable,
    role_groups: HashMap<Role, Vec<CategoryGroup>>,
}

impl AccessPolicy {
    /// The policy shipped with the application
    pub fn builtin() -> Self {
        Self::assemble(builtin::catalog(), builtin::roles(), builtin::routes())
    }

    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::new()
    }

    /// Build and validate a policy from a parsed document
    pub fn from_document(document: PolicyDocument) -> Result<Self> {
        let (catalog, roles, routes) = document.into_tables()?;

        AccessPolicyBuilder::new()
            .catalog(catalog)
            .roles(roles)
            .routes(routes)
            .build()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_document(PolicyDocument::from_json_str(json)?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::from_document(PolicyDocument::from_toml_str(toml)?)
    }

    /// Load a JSON or TOML policy document (chosen by file extension)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading access policy from {}", path.display());
        Self::from_document(PolicyDocument::load(path)?)
    }

    /// Cross-reference check over all tables.
    ///
    /// Fails on the first dangling permission reference, unlabeled
    /// category or malformed route key.
    pub fn validate(&self) -> Result<()> {
        check_tables(&self.catalog, &self.roles, &self.routes)
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    pub fn routes(&self) -> &RouteGuardTable {
        &self.routes
    }

    /// A role's permissions grouped by category (computed at build time)
    pub fn grouped_permissions_of(&self, role: Role) -> &[CategoryGroup] {
        self.role_groups
            .get(&role)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Export the policy as a serializable document
    pub fn to_document(&self) -> PolicyDocument {
        PolicyDocument::from_policy(self)
    }

    fn assemble(catalog: PermissionCatalog, roles: RoleMap, routes: RouteGuardTable) -> Self {
        let role_groups = Role::all()
            .iter()
            .map(|role| (*role, catalog.group(roles.permissions_of(*role))))
            .collect();

        Self {
            catalog,
            roles,
            routes,
            role_groups,
        }
    }
}

/// Cross-reference check shared by [`AccessPolicy::validate`] and the builder
fn check_tables(catalog: &PermissionCatalog, roles: &RoleMap, routes: &RouteGuardTable) -> Result<()> {
    for entry in catalog.permissions() {
        if catalog.category_label(entry.category).is_none() {
            return Err(AuthzError::MissingCategoryLabel(
                entry.category.as_str().to_string(),
            ));
        }
    }

    for (role, permissions) in roles.entries() {
        for permission in permissions.iter() {
            if !catalog.contains(permission) {
                return Err(AuthzError::DanglingPermission {
                    owner: format!("Role '{}'", role),
                    permission: permission.as_str().to_string(),
                });
            }
        }
    }

    for (route, permission) in routes.iter() {
        if !route.starts_with('/') {
            return Err(AuthzError::InvalidRoute(route.to_string()));
        }
        if !catalog.contains(permission) {
            return Err(AuthzError::DanglingPermission {
                owner: format!("Route '{}'", route),
                permission: permission.as_str().to_string(),
            });
        }
    }

    debug!("Access policy cross-references are consistent");
    Ok(())
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Programmatic assembly of an [`AccessPolicy`]
///
/// Starts from empty tables. `build()` validates the configured tables
/// first; remote catalog records are applied only after that and can only
/// update entries that already exist.
#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    catalog: PermissionCatalog,
    roles: RoleMap,
    routes: RouteGuardTable,
    remote_records: Vec<PermissionRecord>,
}

impl AccessPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the built-in tables
    pub fn from_builtin() -> Self {
        Self {
            catalog: builtin::catalog(),
            roles: builtin::roles(),
            routes: builtin::routes(),
            remote_records: Vec::new(),
        }
    }

    pub fn catalog(mut self, catalog: PermissionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn roles(mut self, roles: RoleMap) -> Self {
        self.roles = roles;
        self
    }

    pub fn routes(mut self, routes: RouteGuardTable) -> Self {
        self.routes = routes;
        self
    }

    /// Overlay a permission catalog previously fetched from the settings API
    pub fn remote_catalog(mut self, records: Vec<PermissionRecord>) -> Self {
        self.remote_records = records;
        self
    }

    pub fn build(mut self) -> Result<AccessPolicy> {
        check_tables(&self.catalog, &self.roles, &self.routes)?;

        if !self.remote_records.is_empty() {
            let applied = self.catalog.overlay(&self.remote_records);
            info!(
                "Applied {} remote catalog records ({} received)",
                applied,
                self.remote_records.len()
            );
        }

        let policy = AccessPolicy::assemble(self.catalog, self.roles, self.routes);

        info!(
            "Access policy ready: {} permissions, {} guarded routes",
            policy.catalog.len(),
            policy.routes.len()
        );

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Permission, PermissionCategory};

    #[test]
    fn test_builtin_policy_is_consistent() {
        let policy = AccessPolicy::builtin();
        policy.validate().unwrap();

        assert_eq!(policy.catalog().len(), Permission::all().len());
        assert_eq!(policy.routes().len(), 16);
    }

    #[test]
    fn test_dangling_role_permission_is_rejected() {
        let result = AccessPolicy::builder()
            .catalog(
                PermissionCatalog::new()
                    .with_category(PermissionCategory::Sales, "Sales")
                    .with_permission(Permission::CreateSale, PermissionCategory::Sales, "Sell"),
            )
            .roles(RoleMap::new().with_role(Role::Cashier, [Permission::CreateSale, Permission::VoidSale]))
            .build();

        match result {
            Err(AuthzError::DanglingPermission { owner, permission }) => {
                assert_eq!(owner, "Role 'cashier'");
                assert_eq!(permission, "void_sale");
            }
            other => panic!("expected dangling permission, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_route_permission_is_rejected() {
        let result = AccessPolicy::builder()
            .catalog(
                PermissionCatalog::new()
                    .with_category(PermissionCategory::Users, "Users")
                    .with_permission(Permission::ViewUsers, PermissionCategory::Users, "See users"),
            )
            .routes(RouteGuardTable::new().guard("/roles", Permission::ManageRoles).unwrap())
            .build();

        assert!(matches!(
            result,
            Err(AuthzError::DanglingPermission { ref owner, .. }) if owner == "Route '/roles'"
        ));
    }

    #[test]
    fn test_unlabeled_category_is_rejected() {
        let result = AccessPolicy::builder()
            .catalog(PermissionCatalog::new().with_permission(
                Permission::ViewStock,
                PermissionCategory::Stock,
                "See stock",
            ))
            .build();

        assert!(matches!(result, Err(AuthzError::MissingCategoryLabel(ref c)) if c == "stock"));
    }

    #[test]
    fn test_remote_catalog_overlay_updates_descriptions() {
        let policy = AccessPolicyBuilder::from_builtin()
            .remote_catalog(vec![PermissionRecord {
                name: "approve_expense".to_string(),
                category: Some("expenses".to_string()),
                description: Some("Sign off on expense claims".to_string()),
            }])
            .build()
            .unwrap();

        assert_eq!(
            policy.catalog().description(Permission::ApproveExpense),
            Some("Sign off on expense claims")
        );
    }

    #[test]
    fn test_remote_catalog_cannot_fill_dangling_grant() {
        let result = AccessPolicy::builder()
            .catalog(
                PermissionCatalog::new()
                    .with_category(PermissionCategory::Sales, "Sales")
                    .with_permission(Permission::CreateSale, PermissionCategory::Sales, "Sell"),
            )
            .roles(RoleMap::new().with_role(Role::Cashier, [Permission::CreateSale, Permission::DeleteProduct]))
            .remote_catalog(vec![PermissionRecord {
                name: "delete_product".to_string(),
                category: Some("sales".to_string()),
                description: None,
            }])
            .build();

        assert!(matches!(
            result,
            Err(AuthzError::DanglingPermission { ref permission, .. }) if permission == "delete_product"
        ));
    }

    #[test]
    fn test_remote_category_without_label_is_not_fatal() {
        let policy = AccessPolicyBuilder::from_builtin()
            .catalog(
                PermissionCatalog::new()
                    .with_category(PermissionCategory::Sales, "Sales")
                    .with_permission(Permission::CreateSale, PermissionCategory::Sales, "Sell"),
            )
            .roles(RoleMap::new().with_role(Role::Cashier, [Permission::CreateSale]))
            .routes(RouteGuardTable::new())
            .remote_catalog(vec![PermissionRecord {
                name: "create_sale".to_string(),
                category: Some("stock".to_string()),
                description: Some("Ring it up".to_string()),
            }])
            .build()
            .unwrap();

        assert_eq!(policy.catalog().category_of(Permission::CreateSale), Some(PermissionCategory::Sales));
        assert_eq!(policy.catalog().description(Permission::CreateSale), Some("Ring it up"));
    }

    #[test]
    fn test_grouped_permissions_are_precomputed_per_role() {
        let policy = AccessPolicy::builtin();
        let groups = policy.grouped_permissions_of(Role::Cashier);

        let total: usize = groups.iter().map(|g| g.permissions.len()).sum();
        assert_eq!(total, policy.roles().permissions_of(Role::Cashier).len());
        assert!(groups.iter().all(|g| g.category != PermissionCategory::Users));
    }
}
