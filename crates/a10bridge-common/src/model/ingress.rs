use std::collections::BTreeMap;

use super::{HealthCheck, Node};

/// An ingress controller discovered in the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressController {
    /// Controller name
    pub name: String,
    /// Labels a node must carry to run this controller
    pub node_selector: BTreeMap<String, String>,
    /// Host port the controller serves on
    pub port: u16,
    /// Health check derived from the controller's probe or annotations
    pub health: HealthCheck,
    /// Template producing the service group name
    pub service_group_template: String,
    /// Nodes the controller runs on
    pub nodes: Vec<Node>,
}
