//! Serializable policy document (JSON or TOML)
//!
//! ```toml
//! [[categories]]
//! key = "sales"
//! label = "Sales & POS"
//!
//! [[permissions]]
//! key = "create_sale"
//! category = "sales"
//! description = "Ring up sales at the point of sale"
//!
//! [[roles]]
//! key = "cashier"
//! label = "Cashier"
//! permissions = ["create_sale"]
//!
//! [routes]
//! "/pos" = "create_sale"
//! ```
//!
//! Keys are checked against the closed role/permission/category sets while
//! converting; an unknown key is a load error, not a silent drop.

use super::AccessPolicy;
use crate::catalog::PermissionCatalog;
use crate::error::{AuthzError, Result};
use crate::roles::{RoleMap, RoleProfile};
use crate::routes::RouteGuardTable;
use crate::types::{Permission, PermissionCategory, PermissionSet, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub categories: Vec<CategoryDocument>,

    #[serde(default)]
    pub permissions: Vec<PermissionDocument>,

    #[serde(default)]
    pub roles: Vec<RoleDocument>,

    /// Route → permission key
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDocument {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDocument {
    pub key: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDocument {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub permissions: Vec<String>,
}

impl PolicyDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Read a document, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(AuthzError::Config(format!(
                "Unsupported policy file format: {} (expected .json or .toml)",
                path.display()
            ))),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn from_policy(policy: &AccessPolicy) -> Self {
        let catalog = policy.catalog();
        let role_map = policy.roles();

        let categories = catalog
            .categories()
            .map(|(category, label)| CategoryDocument {
                key: category.as_str().to_string(),
                label: label.to_string(),
            })
            .collect();

        let permissions = catalog
            .permissions()
            .map(|entry| PermissionDocument {
                key: entry.permission.as_str().to_string(),
                category: entry.category.as_str().to_string(),
                description: entry.description.clone(),
            })
            .collect();

        let roles = role_map
            .entries()
            .filter(|(role, _)| role_map.is_configured(*role))
            .map(|(role, permissions)| {
                let profile = role_map.profile(role);
                RoleDocument {
                    key: role.as_str().to_string(),
                    label: profile.map(|p| p.label.clone()),
                    description: profile.map(|p| p.description.clone()),
                    permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
                }
            })
            .collect();

        let routes = policy
            .routes()
            .iter()
            .map(|(route, permission)| (route.to_string(), permission.as_str().to_string()))
            .collect();

        Self {
            categories,
            permissions,
            roles,
            routes,
        }
    }

    /// Convert string keys into typed tables
    pub(crate) fn into_tables(self) -> Result<(PermissionCatalog, RoleMap, RouteGuardTable)> {
        let mut catalog = PermissionCatalog::new();
        for category in &self.categories {
            catalog.set_category_label(category.key.parse::<PermissionCategory>()?, category.label.clone());
        }
        for entry in &self.permissions {
            let permission = entry.key.parse::<Permission>()?;
            let category = entry.category.parse::<PermissionCategory>()?;
            catalog.set_entry(permission, category, entry.description.clone());
        }

        let mut roles = RoleMap::new();
        let mut seen_roles = HashSet::new();
        for doc in &self.roles {
            let role = doc.key.parse::<Role>()?;
            if !seen_roles.insert(role) {
                return Err(AuthzError::InvalidInput(format!(
                    "Role '{}' is defined more than once",
                    role
                )));
            }

            let mut permissions = PermissionSet::new();
            for key in &doc.permissions {
                let permission = key.parse::<Permission>()?;
                if !permissions.insert(permission) {
                    return Err(AuthzError::DuplicatePermission {
                        role: role.as_str().to_string(),
                        permission: key.clone(),
                    });
                }
            }
            roles.grant(role, permissions);

            if doc.label.is_some() || doc.description.is_some() {
                let label = doc.label.clone().unwrap_or_else(|| role.as_str().to_string());
                let description = doc.description.clone().unwrap_or_default();
                roles.set_profile(role, RoleProfile::new(label, description));
            }
        }

        let mut routes = RouteGuardTable::new();
        for (route, key) in &self.routes {
            routes.insert(route, key.parse::<Permission>()?)?;
        }

        Ok((catalog, roles, routes))
    }
}
