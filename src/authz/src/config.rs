//! Service configuration loading
//!
//! ```toml
//! [policy]
//! path = "policy.toml"                  # omit for the built-in policy
//! remote_catalog = "permissions.json"   # optional, fetched catalog snapshot
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [logging]
//! level = "info"
//! ```

use crate::catalog::PermissionRecord;
use crate::error::{AuthzError, Result};
use crate::policy::{AccessPolicy, AccessPolicyBuilder, PolicyDocument};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::info;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthzConfig {
    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicySection {
    /// JSON or TOML policy document; the built-in policy when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// JSON array of permission records previously fetched from the
    /// settings API, overlaid on the catalog
    #[serde(default)]
    pub remote_catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_log_level() -> String { "info".to_string() }

impl AuthzConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `AUTHZ_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("AUTHZ_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("AUTHZ_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AuthzError::Config(format!("AUTHZ_PORT is not a valid port: {}", port)))?;
        }
        if let Some(path) = lookup("AUTHZ_POLICY_PATH") {
            self.policy.path = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup("AUTHZ_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if self.logging.level.trim().is_empty() {
            return Err(AuthzError::Config("logging.level cannot be empty".to_string()));
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| AuthzError::Config(format!("Invalid server.host: {}", self.server.host)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Build the validated access policy this configuration points at
    pub fn build_policy(&self) -> Result<AccessPolicy> {
        let builder = match &self.policy.path {
            Some(path) => {
                info!("Using policy document {}", path.display());
                let (catalog, roles, routes) = PolicyDocument::load(path)?.into_tables()?;
                AccessPolicyBuilder::new().catalog(catalog).roles(roles).routes(routes)
            }
            None => {
                info!("Using built-in access policy");
                AccessPolicyBuilder::from_builtin()
            }
        };

        let builder = match &self.policy.remote_catalog {
            Some(path) => builder.remote_catalog(load_remote_catalog(path)?),
            None => builder,
        };

        builder.build()
    }
}

/// Read a saved snapshot of the remote permission list
pub fn load_remote_catalog(path: &Path) -> Result<Vec<PermissionRecord>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
