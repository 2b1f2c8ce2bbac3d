//! Error types for the authorization engine
//!
//! Decisions never fail. Everything here is raised while loading,
//! assembling or validating an [`AccessPolicy`](crate::policy::AccessPolicy),
//! or while reading configuration.

use thiserror::Error;

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Role key outside the closed role set
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Permission key outside the closed permission vocabulary
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    /// Category key outside the closed category set
    #[error("Unknown permission category: {0}")]
    UnknownCategory(String),

    /// A role or route references a permission missing from the catalog
    #[error("{owner} references permission '{permission}' which is not in the catalog")]
    DanglingPermission { owner: String, permission: String },

    /// The same permission is listed twice for one role
    #[error("Role '{role}' lists permission '{permission}' more than once")]
    DuplicatePermission { role: String, permission: String },

    /// A catalog entry belongs to a category that has no display label
    #[error("Category '{0}' has no display label")]
    MissingCategoryLabel(String),

    /// Malformed route key in the guard table
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Policy or config document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        AuthzError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AuthzError {
    fn from(err: toml::de::Error) -> Self {
        AuthzError::Parse(err.to_string())
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
