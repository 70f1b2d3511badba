//! Appliance instance configuration
//!
//! Instances are read from a YAML file:
//!
//! ```yaml
//! instances:
//!   - name: lb-1
//!     apiUrl: https://lb-1.example.com
//!     apiVersion: 3
//!     userName: admin
//!     password: secret
//! ```
//!
//! `name` defaults to `apiUrl` and `password` falls back to the password
//! given on the command line.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Appliance wire protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum ApiVersion {
    /// aXAPI 2.1, session id passed as a query parameter
    V2,
    /// aXAPI 3, signature passed in the Authorization header
    V3,
}

impl TryFrom<u8> for ApiVersion {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            2 => Ok(ApiVersion::V2),
            3 => Ok(ApiVersion::V3),
            other => Err(format!("unsupported apiVersion {other}, expected 2 or 3")),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V2 => write!(f, "v2"),
            ApiVersion::V3 => write!(f, "v3"),
        }
    }
}

fn default_insecure_skip_verify() -> bool {
    true
}

/// One appliance to keep in sync
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceInstance {
    /// Display name, defaults to the API URL
    #[serde(default)]
    pub name: String,
    /// Base URL of the appliance API, e.g. `https://lb-1.example.com`
    pub api_url: String,
    /// Protocol version spoken by the appliance
    pub api_version: ApiVersion,
    /// Login user
    pub user_name: String,
    /// Login password, defaults to the command line password
    #[serde(default)]
    pub password: String,
    /// Accept self-signed appliance certificates
    #[serde(default = "default_insecure_skip_verify")]
    pub insecure_skip_verify: bool,
}

impl fmt::Debug for ApplianceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplianceInstance")
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

/// Parsed configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Appliances to reconcile, in the order they are processed
    pub instances: Vec<ApplianceInstance>,
}

impl BridgeConfig {
    /// Read and validate the configuration file at `path`
    pub fn load(path: &Path, fallback_password: Option<&str>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content, fallback_password)
    }

    /// Parse and validate configuration YAML
    ///
    /// Applies the name and password defaults before validating.
    pub fn from_yaml(content: &str, fallback_password: Option<&str>) -> Result<Self> {
        let mut config: BridgeConfig = serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("invalid configuration: {e}")))?;

        for instance in &mut config.instances {
            if instance.name.is_empty() {
                instance.name = instance.api_url.clone();
            }
            if instance.password.is_empty() {
                instance.password = fallback_password.unwrap_or_default().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.instances.is_empty() {
            return Err(Error::config_for_field(
                "instances",
                "at least one appliance instance is required",
            ));
        }
        for (i, instance) in self.instances.iter().enumerate() {
            if instance.api_url.trim().is_empty() {
                return Err(Error::config_for_field(
                    format!("instances[{i}].apiUrl"),
                    "apiUrl must not be empty",
                ));
            }
            if instance.user_name.trim().is_empty() {
                return Err(Error::config_for_field(
                    format!("instances[{i}].userName"),
                    format!("userName must not be empty for {}", instance.name),
                ));
            }
            if instance.password.is_empty() {
                return Err(Error::config_for_field(
                    format!("instances[{i}].password"),
                    format!("no password configured for {}", instance.name),
                ));
            }
        }
        Ok(())
    }
}
