//! Error types for a10bridge
//!
//! Errors are structured with fields to aid debugging in production. Variants
//! follow the failure categories of a run: discovering the cluster, rendering
//! group names, loading configuration, talking to an appliance, and converging
//! a single appliance entity.

use thiserror::Error;

/// Error code for failures that did not originate from the appliance itself
pub const LOCAL_ERROR_CODE: i64 = 0;

/// Error returned by an appliance call
///
/// Carries the numeric code reported by the appliance. Transport failures,
/// unexpected HTTP statuses and undecodable bodies use [`LOCAL_ERROR_CODE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} - {message}")]
pub struct ApplianceError {
    /// Appliance error code, or 0 for local failures
    pub code: i64,
    /// Human readable description
    pub message: String,
}

impl ApplianceError {
    /// Create an error carrying an appliance error code
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an error for a failure that happened before or after the appliance answered
    pub fn local(message: impl Into<String>) -> Self {
        Self::new(LOCAL_ERROR_CODE, message)
    }

    /// Whether the error was produced locally rather than by the appliance
    pub fn is_local(&self) -> bool {
        self.code == LOCAL_ERROR_CODE
    }
}

/// Main error type for a10bridge operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Failure to discover the cluster topology
    #[error("discovery error [{context}]: {message}")]
    Discovery {
        /// Description of what failed
        message: String,
        /// Object or step being discovered (e.g., "config-map", "nodes")
        context: String,
    },

    /// Group name template could not be rendered
    #[error("template error for '{template}': {message}")]
    Template {
        /// The template source
        template: String,
        /// Description of what failed
        message: String,
    },

    /// Invalid configuration file or arguments
    #[error("configuration error: {message}")]
    Config {
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "instances[0].apiUrl")
        field: Option<String>,
    },

    /// Appliance call failed
    #[error("appliance error: {source}")]
    Appliance {
        /// The error reported by the appliance client
        #[from]
        source: ApplianceError,
    },

    /// An appliance entity could not be converged
    #[error("reconcile error for {entity}: {message}")]
    Reconcile {
        /// Name of the server, health monitor or service group
        entity: String,
        /// Description of what failed
        message: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "orchestrator")
        context: String,
    },
}

impl Error {
    /// Create a discovery error with context
    pub fn discovery_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Discovery {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Create a template error for the given template source
    pub fn template(template: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: msg.into(),
        }
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a configuration error with a field path
    pub fn config_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a reconcile error for an appliance entity
    pub fn reconcile_for(entity: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Reconcile {
            entity: entity.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Get the entity name if this error is tied to one appliance entity
    pub fn entity(&self) -> Option<&str> {
        match self {
            Error::Reconcile { entity, .. } => Some(entity),
            _ => None,
        }
    }

    /// Get the appliance error code if this error came from an appliance call
    pub fn appliance_code(&self) -> Option<i64> {
        match self {
            Error::Appliance { source } => Some(source.code),
            _ => None,
        }
    }

    /// Get the context if this error has one
    pub fn context(&self) -> Option<&str> {
        match self {
            Error::Discovery { context, .. } => Some(context),
            Error::Internal { context, .. } => Some(context),
            _ => None,
        }
    }
}
