//! Decision engine
//!
//! Pure lookups over a shared, immutable [`AccessPolicy`]:
//!
//! ```text
//! (role, permission) ──► RoleMap ──────────────────────► allow / deny
//! (role, route) ──► RouteGuardTable ──┬─ unmapped ─────► allow (fail-open)
//!                                     └─ permission P ─► has_permission(role, P)
//! ```
//!
//! Unmapped routes are allowed and mapped routes are denied unless the role
//! holds the permission. Both defaults are load-bearing: flipping the first
//! breaks navigation to public pages, flipping the second opens guarded
//! pages to everyone.
//!
//! The typed methods take [`Role`]/[`Permission`] values. The `check_*` and
//! `*_raw` methods accept raw keys from less trusted sources and apply the
//! fallbacks: an unknown role holds nothing, an unknown permission is never
//! granted. None of them return errors.

pub mod decision;

pub use decision::{AccessDecision, DecisionReason, PermissionCheck, RouteCheck};

use crate::catalog::CategoryGroup;
use crate::policy::AccessPolicy;
use crate::types::{Permission, PermissionSet, Role};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization decision engine
///
/// Cheap to clone; clones share the same policy. Safe to use from any
/// number of threads or tasks without locking.
#[derive(Debug, Clone)]
pub struct AccessEngine {
    policy: Arc<AccessPolicy>,
}

impl AccessEngine {
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }

    /// Engine over the built-in policy
    pub fn builtin() -> Self {
        Self::new(Arc::new(AccessPolicy::builtin()))
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    // ---------------------------------------------------------------------
    // Typed decisions
    // ---------------------------------------------------------------------

    /// Permissions held by `role` (empty if the role has no entry)
    pub fn permissions_of(&self, role: Role) -> &PermissionSet {
        self.policy.roles().permissions_of(role)
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        let allowed = self.permissions_of(role).contains(permission);
        debug!(role = %role, permission = %permission, allowed, "Permission check");
        allowed
    }

    pub fn can_access_route(&self, role: Role, route: &str) -> bool {
        self.decide_route(role, route).allowed
    }

    /// Route decision with its reason
    pub fn decide_route(&self, role: Role, route: &str) -> AccessDecision {
        let decision = match self.policy.routes().required_permission(route) {
            None => AccessDecision::allow(DecisionReason::UnguardedRoute, None),
            Some(required) if self.permissions_of(role).contains(required) => {
                AccessDecision::allow(DecisionReason::Granted, Some(required))
            }
            Some(required) => AccessDecision::deny(DecisionReason::MissingPermission, Some(required)),
        };

        debug!(
            role = %role,
            route,
            allowed = decision.allowed,
            reason = ?decision.reason,
            "Route check"
        );
        decision
    }

    // ---------------------------------------------------------------------
    // Raw-key decisions
    // ---------------------------------------------------------------------

    /// Permissions for a raw role key; unknown roles hold nothing
    pub fn permissions_of_raw(&self, role: &str) -> &PermissionSet {
        match Role::parse(role) {
            Some(role) => self.permissions_of(role),
            None => {
                warn!(role, "Unknown role, treating as holding no permissions");
                self.policy.roles().empty_set()
            }
        }
    }

    pub fn check_permission(&self, role: &str, permission: &str) -> AccessDecision {
        let Some(parsed_role) = Role::parse(role) else {
            warn!(role, permission, "Permission check for unknown role");
            return AccessDecision::deny(DecisionReason::UnknownRole, Permission::parse(permission));
        };

        let Some(parsed_permission) = Permission::parse(permission) else {
            warn!(role, permission, "Permission check for unknown permission");
            return AccessDecision::deny(DecisionReason::UnknownPermission, None);
        };

        if self.has_permission(parsed_role, parsed_permission) {
            AccessDecision::allow(DecisionReason::Granted, Some(parsed_permission))
        } else {
            AccessDecision::deny(DecisionReason::MissingPermission, Some(parsed_permission))
        }
    }

    pub fn check_route(&self, role: &str, route: &str) -> AccessDecision {
        if let Some(parsed_role) = Role::parse(role) {
            return self.decide_route(parsed_role, route);
        }

        match self.policy.routes().required_permission(route) {
            None => AccessDecision::allow(DecisionReason::UnguardedRoute, None),
            Some(required) => {
                warn!(role, route, "Route check for unknown role");
                AccessDecision::deny(DecisionReason::UnknownRole, Some(required))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Display lookups
    // ---------------------------------------------------------------------

    /// Role label, or the raw key when the role has no profile
    pub fn role_label<'a>(&'a self, role: &'a str) -> &'a str {
        self.policy.roles().label_or_key(role)
    }

    pub fn role_description<'a>(&'a self, role: &'a str) -> &'a str {
        self.policy.roles().description_or_key(role)
    }

    pub fn permission_description<'a>(&'a self, permission: &'a str) -> &'a str {
        self.policy.catalog().description_or_key(permission)
    }

    pub fn category_label<'a>(&'a self, category: &'a str) -> &'a str {
        self.policy.catalog().category_label_or_key(category)
    }

    /// A role's permissions grouped by category
    pub fn grouped_permissions_of(&self, role: Role) -> &[CategoryGroup] {
        self.policy.grouped_permissions_of(role)
    }
}

impl Default for AccessEngine {
    fn default() -> Self {
        Self::builtin()
    }
}
