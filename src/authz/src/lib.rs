//! # ShopDesk Authorization Engine
//!
//! Role-based access control for the ShopDesk back office.
//!
//! ## Features
//!
//! - **Closed role and permission vocabularies** parsed at the boundary
//! - **Immutable policy object** built once and shared through `Arc`
//! - **Startup consistency check** for dangling or duplicate references
//! - **Route guard table** with fail-open defaults for unmapped routes
//! - **Grouped catalog views** computed once at load time
//! - **Tower middleware** and an axum decision API on top of the engine
//!
//! ## Example
//!
//! ```rust
//! use shopdesk_authz::{AccessEngine, Permission, Role};
//!
//! let engine = AccessEngine::builtin();
//!
//! assert!(engine.has_permission(Role::Accountant, Permission::ApproveExpense));
//! assert!(!engine.can_access_route(Role::Cashier, "/users"));
//!
//! // Unmapped routes are open to every role
//! assert!(engine.can_access_route(Role::Manager, "/unknown-path"));
//!
//! // Raw keys from session data never error
//! assert!(engine.permissions_of_raw("unknown-role").is_empty());
//! ```

pub mod types;
pub mod error;
pub mod catalog;
pub mod roles;
pub mod routes;
pub mod policy;
pub mod engine;
pub mod config;
pub mod guard;
pub mod http;

// Re-export commonly used types
pub use types::{Permission, PermissionCategory, PermissionSet, Role};
pub use catalog::{CategoryGroup, PermissionCatalog, PermissionEntry, PermissionRecord};
pub use roles::{RoleMap, RoleProfile};
pub use routes::RouteGuardTable;
pub use policy::{AccessPolicy, AccessPolicyBuilder, PolicyDocument};
pub use engine::{AccessDecision, AccessEngine, DecisionReason, PermissionCheck, RouteCheck};
pub use config::AuthzConfig;
pub use guard::{RouteGuardLayer, SessionRole};
pub use error::{AuthzError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
