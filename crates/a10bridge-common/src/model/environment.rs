use serde::Serialize;

/// Cluster identity used to render service group name templates
///
/// Serialized with the field names templates refer to: `Cluster`,
/// `DataCenter` and `Type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Environment {
    /// Full cluster name
    #[serde(rename = "Cluster")]
    pub cluster: String,
    /// Data center, the first dash separated part of the cluster name
    #[serde(rename = "DataCenter")]
    pub data_center: String,
    /// Cluster type, the second dash separated part of the cluster name
    #[serde(rename = "Type")]
    pub cluster_type: String,
}

impl Environment {
    /// Derive the environment from a cluster name such as `dc1-prod-blue`
    pub fn from_cluster_name(name: &str) -> Self {
        let mut parts = name.split('-');
        let data_center = parts.next().unwrap_or_default().to_string();
        let cluster_type = parts.next().unwrap_or_default().to_string();
        Self {
            cluster: name.to_string(),
            data_center,
            cluster_type,
        }
    }
}
