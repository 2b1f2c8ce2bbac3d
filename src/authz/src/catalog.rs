//! Permission catalog
//!
//! Registry of every grantable permission with its category and display
//! description, plus the display labels of the categories. The grouped
//! (category → permissions) view is derived once whenever the catalog
//! changes, never per lookup.

use crate::types::{Permission, PermissionCategory, PermissionSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Catalog entry for one permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    /// Permission key
    pub permission: Permission,

    /// Category the permission is displayed under
    pub category: PermissionCategory,

    /// Human-readable description
    pub description: String,
}

/// One category with the permissions filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: PermissionCategory,
    pub label: String,
    pub permissions: Vec<PermissionEntry>,
}

/// Permission record as served by the remote settings API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Permission key (e.g. "create_sale")
    pub name: String,

    /// Category key, when the remote side supplies one
    #[serde(default)]
    pub category: Option<String>,

    /// Display description, when the remote side supplies one
    #[serde(default)]
    pub description: Option<String>,
}

/// Registry of permissions and category labels
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    entries: HashMap<Permission, PermissionEntry>,
    order: Vec<Permission>,
    category_labels: HashMap<PermissionCategory, String>,
    category_order: Vec<PermissionCategory>,
    groups: Vec<CategoryGroup>,
}

impl PermissionCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or relabel) a category
    pub fn with_category(mut self, category: PermissionCategory, label: impl Into<String>) -> Self {
        self.set_category_label(category, label);
        self
    }

    /// Register (or replace) a permission entry
    pub fn with_permission(
        mut self,
        permission: Permission,
        category: PermissionCategory,
        description: impl Into<String>,
    ) -> Self {
        self.set_entry(permission, category, description);
        self
    }

    pub(crate) fn set_category_label(&mut self, category: PermissionCategory, label: impl Into<String>) {
        if self.category_labels.insert(category, label.into()).is_none() {
            self.category_order.push(category);
        }
        self.regroup();
    }

    pub(crate) fn set_entry(
        &mut self,
        permission: Permission,
        category: PermissionCategory,
        description: impl Into<String>,
    ) {
        let entry = PermissionEntry {
            permission,
            category,
            description: description.into(),
        };
        if self.entries.insert(permission, entry).is_none() {
            self.order.push(permission);
        }
        self.regroup();
    }

    /// Merge a previously fetched remote permission list over this catalog.
    ///
    /// Only entries the catalog already holds are touched: their
    /// description and/or category are replaced. A key missing from the
    /// catalog is skipped, and so is a category move into a category with
    /// no display label. Returns the number of records applied.
    pub fn overlay(&mut self, records: &[PermissionRecord]) -> usize {
        let mut applied = 0;

        for record in records {
            let Some(current) = self.entry_by_key(&record.name).cloned() else {
                warn!(permission = %record.name, "Skipping remote catalog record for permission not in catalog");
                continue;
            };

            let category = match record.category.as_deref() {
                Some(key) => match PermissionCategory::parse(key) {
                    Some(category) if self.category_labels.contains_key(&category) => category,
                    Some(_) => {
                        warn!(
                            permission = %record.name,
                            category = %key,
                            "Remote category has no display label, keeping current one"
                        );
                        current.category
                    }
                    None => {
                        warn!(
                            permission = %record.name,
                            category = %key,
                            "Unknown category in remote catalog, keeping current one"
                        );
                        current.category
                    }
                },
                None => current.category,
            };

            let description = match &record.description {
                Some(text) if !text.trim().is_empty() => text.clone(),
                _ => current.description,
            };

            self.entries.insert(
                current.permission,
                PermissionEntry {
                    permission: current.permission,
                    category,
                    description,
                },
            );
            applied += 1;
        }

        self.regroup();
        debug!("Applied {} of {} remote catalog records", applied, records.len());
        applied
    }

    /// Catalog entry for a permission
    pub fn entry(&self, permission: Permission) -> Option<&PermissionEntry> {
        self.entries.get(&permission)
    }

    /// Whether the permission has a description table entry
    pub fn contains(&self, permission: Permission) -> bool {
        self.entries.contains_key(&permission)
    }

    pub fn description(&self, permission: Permission) -> Option<&str> {
        self.entries.get(&permission).map(|e| e.description.as_str())
    }

    pub fn category_of(&self, permission: Permission) -> Option<PermissionCategory> {
        self.entries.get(&permission).map(|e| e.category)
    }

    pub fn category_label(&self, category: PermissionCategory) -> Option<&str> {
        self.category_labels.get(&category).map(String::as_str)
    }

    /// Look up an entry by its raw key
    pub fn entry_by_key(&self, key: &str) -> Option<&PermissionEntry> {
        Permission::parse(key).and_then(|p| self.entries.get(&p))
    }

    /// Description for a raw permission key, or the key itself when unknown
    pub fn description_or_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.entry_by_key(key)
            .map(|e| e.description.as_str())
            .unwrap_or(key)
    }

    /// Label for a raw category key, or the key itself when unknown
    pub fn category_label_or_key<'a>(&'a self, key: &'a str) -> &'a str {
        PermissionCategory::parse(key)
            .and_then(|c| self.category_label(c))
            .unwrap_or(key)
    }

    /// Permissions in catalog order
    pub fn permissions(&self) -> impl Iterator<Item = &PermissionEntry> + '_ {
        self.order.iter().filter_map(|p| self.entries.get(p))
    }

    /// Categories that carry a display label, in registration order
    pub fn categories(&self) -> impl Iterator<Item = (PermissionCategory, &str)> + '_ {
        self.category_order
            .iter()
            .filter_map(|c| self.category_labels.get(c).map(|l| (*c, l.as_str())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The whole catalog grouped by category
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Group a subset of permissions by category.
    ///
    /// Permissions without a catalog entry are left out; they have nothing
    /// to display.
    pub fn group(&self, permissions: &PermissionSet) -> Vec<CategoryGroup> {
        self.build_groups(|p| permissions.contains(p))
    }

    fn regroup(&mut self) {
        self.groups = self.build_groups(|_| true);
    }

    fn build_groups(&self, include: impl Fn(Permission) -> bool) -> Vec<CategoryGroup> {
        let mut order = self.category_order.clone();
        for permission in &self.order {
            if let Some(entry) = self.entries.get(permission) {
                if !order.contains(&entry.category) {
                    order.push(entry.category);
                }
            }
        }

        order
            .into_iter()
            .filter_map(|category| {
                let permissions: Vec<PermissionEntry> = self
                    .permissions()
                    .filter(|e| e.category == category && include(e.permission))
                    .cloned()
                    .collect();

                if permissions.is_empty() {
                    return None;
                }

                let label = self
                    .category_label(category)
                    .unwrap_or(category.as_str())
                    .to_string();

                Some(CategoryGroup {
                    category,
                    label,
                    permissions,
                })
            })
            .collect()
    }
}
