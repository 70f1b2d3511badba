//! Appliance client contract
//!
//! Provides a trait-based abstraction over the appliance API so the
//! reconcilers never see protocol details. Tests substitute mocks or fakes;
//! production code uses the HTTP implementations in [`crate::v2`] and
//! [`crate::v3`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

#[cfg(test)]
use mockall::automock;

use a10bridge_common::config::{ApiVersion, ApplianceInstance};
use a10bridge_common::model::{HealthCheck, Member, Node, ServiceGroup};
use a10bridge_common::ApplianceError;

use crate::http::Transport;
use crate::{v2, v3, DEFAULT_REQUEST_TIMEOUT};

/// Trait abstracting one authenticated appliance session
///
/// Every call returns an [`ApplianceError`] carrying the appliance's error
/// code. The `is_*` predicates classify those codes for the protocol version
/// behind the session, so callers never compare codes themselves.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApplianceClient: Send + Sync {
    /// Fetch the server registered under `server_name`
    ///
    /// The returned node carries the appliance server name, address and
    /// weight; its logical name is empty.
    async fn get_server(&self, server_name: &str) -> Result<Node, ApplianceError>;

    /// Register a server for `node`
    async fn create_server(&self, node: &Node) -> Result<(), ApplianceError>;

    /// Overwrite the address and weight of the server for `node`
    async fn update_server(&self, node: &Node) -> Result<(), ApplianceError>;

    /// Fetch the health monitor named `name`
    async fn get_health_monitor(&self, name: &str) -> Result<HealthCheck, ApplianceError>;

    /// Create a health monitor
    async fn create_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError>;

    /// Overwrite every field of an existing health monitor
    async fn update_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError>;

    /// Fetch a service group with its health monitor name and members
    async fn get_service_group(&self, name: &str) -> Result<ServiceGroup, ApplianceError>;

    /// Create a service group with its health monitor and full member list
    async fn create_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError>;

    /// Update a service group's health monitor and member list
    async fn update_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError>;

    /// Add one member to its service group
    async fn create_member(&self, member: &Member) -> Result<(), ApplianceError>;

    /// Remove one member from its service group
    async fn delete_member(&self, member: &Member) -> Result<(), ApplianceError>;

    /// End the session
    async fn close(&self) -> Result<(), ApplianceError>;

    /// Whether `err` means the requested server does not exist
    fn is_server_not_found(&self, err: &ApplianceError) -> bool;

    /// Whether `err` means the requested health monitor does not exist
    fn is_health_monitor_not_found(&self, err: &ApplianceError) -> bool;

    /// Whether `err` means the requested service group does not exist
    fn is_service_group_not_found(&self, err: &ApplianceError) -> bool;

    /// Whether `err` means the member being created is already in the group
    fn is_member_already_exists(&self, err: &ApplianceError) -> bool;
}

/// Trait abstracting session creation for an appliance instance
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApplianceConnector: Send + Sync {
    /// Authenticate against `instance` and return a client bound to the session
    async fn connect(
        &self,
        instance: &ApplianceInstance,
    ) -> Result<Box<dyn ApplianceClient>, ApplianceError>;
}

/// Connector speaking HTTP to real appliances
///
/// The protocol implementation is chosen from the instance's `apiVersion`.
#[derive(Debug, Clone)]
pub struct HttpApplianceConnector {
    timeout: Duration,
}

impl Default for HttpApplianceConnector {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl HttpApplianceConnector {
    /// Create a connector with the given per-request timeout
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ApplianceConnector for HttpApplianceConnector {
    #[instrument(
        skip(self, instance),
        fields(instance = %instance.name, version = %instance.api_version)
    )]
    async fn connect(
        &self,
        instance: &ApplianceInstance,
    ) -> Result<Box<dyn ApplianceClient>, ApplianceError> {
        let transport = Transport::new(instance, self.timeout)?;
        let client: Box<dyn ApplianceClient> = match instance.api_version {
            ApiVersion::V2 => Box::new(
                v2::V2Client::connect(transport, &instance.user_name, &instance.password).await?,
            ),
            ApiVersion::V3 => Box::new(
                v3::V3Client::connect(transport, &instance.user_name, &instance.password).await?,
            ),
        };
        info!("appliance session established");
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(api_url: &str) -> ApplianceInstance {
        ApplianceInstance {
            name: "lb".to_string(),
            api_url: api_url.to_string(),
            api_version: ApiVersion::V3,
            user_name: "admin".to_string(),
            password: "pwd".to_string(),
            insecure_skip_verify: false,
        }
    }

    /// Story: a typo in the configured URL fails that instance locally
    #[tokio::test]
    async fn story_invalid_url_fails_without_network() {
        let err = HttpApplianceConnector::default()
            .connect(&instance("lb-1 without scheme"))
            .await
            .err()
            .expect("connect should fail");
        assert!(err.is_local());
        assert!(err.message.contains("apiUrl"));
    }

    /// Story: the reconcilers can classify errors through any client
    #[test]
    fn story_predicates_are_available_on_trait_objects() {
        let mut mock = MockApplianceClient::new();
        mock.expect_is_server_not_found()
            .returning(|err| err.code == 42);
        let client: Box<dyn ApplianceClient> = Box::new(mock);

        assert!(client.is_server_not_found(&ApplianceError::new(42, "gone")));
        assert!(!client.is_server_not_found(&ApplianceError::local("io")));
    }
}
