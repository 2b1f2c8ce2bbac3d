//! Route guard table
//!
//! Maps a navigational route to the single permission required to view it.
//! A route that is not in the table is unguarded: access decisions for it
//! are allowed (fail-open). Every route that must be protected therefore
//! has to appear here.

use crate::error::{AuthzError, Result};
use crate::types::Permission;
use std::collections::BTreeMap;

/// Route → required permission table
#[derive(Debug, Clone, Default)]
pub struct RouteGuardTable {
    guards: BTreeMap<String, Permission>,
}

impl RouteGuardTable {
    /// Create an empty table (every route unguarded)
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard `route` with `permission`
    ///
    /// The route is stored in normalized form.
    pub fn guard(mut self, route: &str, permission: Permission) -> Result<Self> {
        self.insert(route, permission)?;
        Ok(self)
    }

    pub(crate) fn insert(&mut self, route: &str, permission: Permission) -> Result<()> {
        if route.trim().is_empty() {
            return Err(AuthzError::InvalidRoute("route cannot be empty".to_string()));
        }
        if !route.starts_with('/') {
            return Err(AuthzError::InvalidRoute(format!(
                "route '{}' must start with '/'",
                route
            )));
        }

        self.insert_unchecked(route, permission);
        Ok(())
    }

    /// Insert without shape checks; `AccessPolicy::validate` still covers the key.
    pub(crate) fn insert_unchecked(&mut self, route: &str, permission: Permission) {
        self.guards.insert(normalize(route).to_string(), permission);
    }

    /// Permission required for `route`, or `None` if the route is unguarded
    pub fn required_permission(&self, route: &str) -> Option<Permission> {
        self.guards.get(normalize(route)).copied()
    }

    pub fn is_guarded(&self, route: &str) -> bool {
        self.required_permission(route).is_some()
    }

    /// Guarded routes in lexical order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Permission)> + '_ {
        self.guards.iter().map(|(route, p)| (route.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

/// Strip query string, fragment and a single trailing slash.
///
/// The root route `/` is kept as is.
pub fn normalize(route: &str) -> &str {
    let end = route.find(|c| c == '?' || c == '#').unwrap_or(route.len());
    let path = &route[..end];

    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
