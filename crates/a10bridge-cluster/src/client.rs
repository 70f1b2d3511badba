//! Kubernetes access for desired state discovery

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::core::v1::{ConfigMap, Node as K8sNode};
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, instrument, warn};

#[cfg(test)]
use mockall::automock;

use a10bridge_common::model::{IngressController, Node};
use a10bridge_common::{Result, INGRESS_NAMESPACE};

use crate::convert::{ingress_controller_from_daemon_set, is_ingress_controller_name, node_from_k8s};
use crate::resolver::{DnsResolver, HostResolver};

/// Read-only view of the cluster objects the bridge cares about
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List all nodes, with their addresses resolved
    async fn get_nodes(&self) -> Result<Vec<Node>>;

    /// Fetch a config map's data, `None` if it does not exist
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>>;

    /// List the ingress controllers exposed through the appliance
    async fn get_ingress_controllers(&self) -> Result<Vec<IngressController>>;
}

/// [`ClusterClient`] backed by the Kubernetes API
pub struct KubeClusterClient {
    client: Client,
    resolver: Arc<dyn HostResolver>,
}

impl KubeClusterClient {
    /// Create a client over an existing kube client and resolver
    pub fn new(client: Client, resolver: Arc<dyn HostResolver>) -> Self {
        Self { client, resolver }
    }

    /// Create a client from the ambient kubeconfig or in-cluster config, resolving through DNS
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client, Arc::new(DnsResolver)))
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    #[instrument(skip(self))]
    async fn get_nodes(&self) -> Result<Vec<Node>> {
        let api: Api<K8sNode> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;

        let mut nodes = Vec::with_capacity(list.items.len());
        for item in &list.items {
            let ip = self.resolver.resolve(&item.name_any()).await?;
            nodes.push(node_from_k8s(item, ip));
        }
        debug!(count = nodes.len(), "listed cluster nodes");
        Ok(nodes)
    }

    #[instrument(skip(self))]
    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let config_map = api.get_opt(name).await?;
        Ok(config_map.map(|cm| cm.data.unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn get_ingress_controllers(&self) -> Result<Vec<IngressController>> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), INGRESS_NAMESPACE);
        let list = api.list(&ListParams::default()).await?;

        let mut controllers = Vec::new();
        for daemon_set in list
            .items
            .iter()
            .filter(|ds| is_ingress_controller_name(&ds.name_any()))
        {
            match ingress_controller_from_daemon_set(daemon_set) {
                Ok(Some(controller)) => controllers.push(controller),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        controller = %daemon_set.name_any(),
                        error = %e,
                        "skipping ingress controller"
                    );
                }
            }
        }
        debug!(count = controllers.len(), "listed ingress controllers");
        Ok(controllers)
    }
}
