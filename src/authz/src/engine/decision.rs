//! Access decision types and check requests

use crate::types::Permission;
use serde::{Deserialize, Serialize};

/// Permission check as received from an untrusted boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheck {
    /// Role key (e.g. "cashier")
    pub role: String,

    /// Permission key (e.g. "create_sale")
    pub permission: String,
}

/// Route check as received from an untrusted boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCheck {
    /// Role key
    pub role: String,

    /// Navigational route (e.g. "/users")
    pub route: String,
}

/// Outcome of a permission or route check
///
/// Decisions carry no ids or timestamps: the same inputs always produce an
/// equal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    /// Whether access is allowed
    pub allowed: bool,

    /// Why
    pub reason: DecisionReason,

    /// Permission the decision was made against, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<Permission>,
}

impl AccessDecision {
    pub fn allow(reason: DecisionReason, required_permission: Option<Permission>) -> Self {
        Self {
            allowed: true,
            reason,
            required_permission,
        }
    }

    pub fn deny(reason: DecisionReason, required_permission: Option<Permission>) -> Self {
        Self {
            allowed: false,
            reason,
            required_permission,
        }
    }
}

/// Reason for an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The role holds the required permission
    Granted,

    /// The role does not hold the required permission
    MissingPermission,

    /// The route has no guard entry and is open to everyone
    UnguardedRoute,

    /// The role key is outside the closed role set
    UnknownRole,

    /// The permission key is outside the vocabulary
    UnknownPermission,
}

impl DecisionReason {
    pub fn message(&self) -> &'static str {
        match self {
            DecisionReason::Granted => "role holds the required permission",
            DecisionReason::MissingPermission => "role lacks the required permission",
            DecisionReason::UnguardedRoute => "route is not guarded",
            DecisionReason::UnknownRole => "unknown role has no permissions",
            DecisionReason::UnknownPermission => "unknown permission cannot be granted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_and_deny() {
        let allow = AccessDecision::allow(DecisionReason::Granted, Some(Permission::ViewUsers));
        assert!(allow.allowed);
        assert_eq!(allow.required_permission, Some(Permission::ViewUsers));

        let deny = AccessDecision::deny(DecisionReason::UnknownRole, None);
        assert!(!deny.allowed);
    }

    #[test]
    fn test_decision_serialization() {
        let decision = AccessDecision::deny(
            DecisionReason::MissingPermission,
            Some(Permission::ViewUsers),
        );
        let json = serde_json::to_value(decision).unwrap();

        assert_eq!(json["allowed"], false);
        assert_eq!(json["reason"], "missing_permission");
        assert_eq!(json["required_permission"], "view_users");

        let open = serde_json::to_value(AccessDecision::allow(DecisionReason::UnguardedRoute, None)).unwrap();
        assert!(open.get("required_permission").is_none());
    }
}
