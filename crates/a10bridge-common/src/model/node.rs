use std::collections::BTreeMap;

use crate::DEFAULT_SERVER_WEIGHT;

/// A cluster node offered to the appliance as a backend server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Logical (cluster) name of the node
    pub name: String,
    /// Server name used on the appliance
    pub a10_server: String,
    /// Address the appliance sends traffic to
    pub ip: String,
    /// Server weight, kept as the string it was declared with
    pub weight: String,
    /// Node labels, used to match ingress controller node selectors
    pub labels: BTreeMap<String, String>,
}

impl Node {
    /// Create a node whose appliance server name is its logical name
    pub fn new(name: impl Into<String>, ip: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            a10_server: name.clone(),
            name,
            ip: ip.into(),
            weight: DEFAULT_SERVER_WEIGHT.to_string(),
            labels: BTreeMap::new(),
        }
    }

    /// Override the appliance server name
    pub fn with_server_name(mut self, server: impl Into<String>) -> Self {
        self.a10_server = server.into();
        self
    }

    /// Override the server weight
    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = weight.into();
        self
    }

    /// Attach a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Whether every selector entry is present on this node with the same value
    ///
    /// An empty selector matches every node.
    pub fn matches_selector(&self, selector: &BTreeMap<String, String>) -> bool {
        selector
            .iter()
            .all(|(key, value)| self.labels.get(key) == Some(value))
    }

    /// Whether the appliance server already carries this node's address and weight
    ///
    /// Weights are compared as strings: `"01"` and `"1"` differ.
    pub fn same_server_config(&self, actual: &Node) -> bool {
        self.ip == actual.ip && self.weight == actual.weight
    }
}
