//! Common types for a10bridge: the reconciliation model, errors, configuration and telemetry

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod model;
pub mod telemetry;
pub mod template;

pub use error::{ApplianceError, Error};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Namespace holding the ingress controllers and the cluster config map
pub const INGRESS_NAMESPACE: &str = "ingress";

/// Name of the config map describing the cluster
pub const CLUSTER_CONFIG_MAP: &str = "cluster-configs";

/// Key in the cluster config map holding the cluster name
pub const CLUSTER_NAME_KEY: &str = "name";

/// Name suffix that marks a daemon set as an ingress controller
pub const INGRESS_CONTROLLER_SUFFIX: &str = "ingress-controller";

/// Port name suffix identifying the serving container of an ingress controller
pub const HTTP_PORT_SUFFIX: &str = "http";

/// Annotation holding the service group name template of an ingress controller
pub const SERVICE_GROUP_ANNOTATION: &str = "a10.service_group";

/// Annotation overriding the health check endpoint of an ingress controller
pub const HEALTH_ENDPOINT_ANNOTATION: &str = "a10.health.endpoint";

/// Annotation overriding the health check port of an ingress controller
pub const HEALTH_PORT_ANNOTATION: &str = "a10.health.port";

/// Annotation overriding the appliance server name of a node
pub const SERVER_NAME_ANNOTATION: &str = "a10.server";

/// Annotation overriding the appliance server weight of a node
pub const SERVER_WEIGHT_ANNOTATION: &str = "a10.server.weight";

/// Weight used for nodes without a weight annotation
pub const DEFAULT_SERVER_WEIGHT: &str = "1";

/// Expected status code for health checks derived from a liveness probe
pub const DEFAULT_EXPECT_CODE: &str = "200";

/// Endpoint probed for service groups fed by more than one ingress controller
pub const SYNTHETIC_HEALTH_ENDPOINT: &str = "/syntheticHealth";

/// Status code expected from the synthetic health endpoint
pub const SYNTHETIC_EXPECT_CODE: &str = "404";
