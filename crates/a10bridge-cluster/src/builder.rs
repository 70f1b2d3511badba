//! Desired state construction from cluster discovery

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use a10bridge_common::model::{Environment, IngressController, Node, ServiceGroup};
use a10bridge_common::template::TemplateEngine;
use a10bridge_common::{
    Error, Result, CLUSTER_CONFIG_MAP, CLUSTER_NAME_KEY, INGRESS_NAMESPACE, SYNTHETIC_EXPECT_CODE,
    SYNTHETIC_HEALTH_ENDPOINT,
};

use crate::client::ClusterClient;

/// What the appliance should carry, as computed from one cluster snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    /// Nodes running at least one exposed ingress controller, by node name
    pub nodes: HashMap<String, Node>,
    /// Service groups, by group name
    pub service_groups: HashMap<String, ServiceGroup>,
}

/// Builds [`DesiredState`] from a [`ClusterClient`]
pub struct DesiredStateBuilder {
    client: Arc<dyn ClusterClient>,
    templates: TemplateEngine,
}

impl DesiredStateBuilder {
    /// Create a builder reading from `client`
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            client,
            templates: TemplateEngine::new(),
        }
    }

    /// Read the cluster environment from the cluster config map
    pub async fn build_environment(&self) -> Result<Environment> {
        let context = format!("configmap/{INGRESS_NAMESPACE}/{CLUSTER_CONFIG_MAP}");
        let data = self
            .client
            .get_config_map(INGRESS_NAMESPACE, CLUSTER_CONFIG_MAP)
            .await?
            .ok_or_else(|| Error::discovery_with_context(&context, "config map not found"))?;

        match data.get(CLUSTER_NAME_KEY).map(|name| name.trim()) {
            Some(name) if !name.is_empty() => Ok(Environment::from_cluster_name(name)),
            _ => Err(Error::discovery_with_context(
                &context,
                format!("missing or empty key '{CLUSTER_NAME_KEY}'"),
            )),
        }
    }

    /// Ingress controllers exposed through the appliance
    pub async fn find_ingress_controllers(&self) -> Result<Vec<IngressController>> {
        self.client.get_ingress_controllers().await
    }

    /// Nodes carrying every label of `selector`
    pub async fn find_nodes(&self, selector: &BTreeMap<String, String>) -> Result<Vec<Node>> {
        let nodes = self.client.get_nodes().await?;
        Ok(nodes
            .into_iter()
            .filter(|node| node.matches_selector(selector))
            .collect())
    }

    /// Group controllers into service groups by their rendered group name
    ///
    /// A controller whose template fails to render is skipped. Groups fed by
    /// more than one controller get the synthetic health check, since no
    /// single controller's probe represents them.
    pub fn build_service_groups(
        &self,
        controllers: &[IngressController],
        environment: &Environment,
    ) -> HashMap<String, ServiceGroup> {
        let mut groups: HashMap<String, ServiceGroup> = HashMap::new();

        for controller in controllers {
            let name = match self
                .templates
                .render(&controller.service_group_template, environment)
            {
                Ok(name) => name,
                Err(e) => {
                    warn!(controller = %controller.name, error = %e, "skipping ingress controller");
                    continue;
                }
            };

            let group = groups.entry(name.clone()).or_insert_with(|| {
                let mut health = controller.health.clone();
                health.name = name.clone();
                ServiceGroup {
                    name: name.clone(),
                    health,
                    ..Default::default()
                }
            });
            group.ingress_controllers.push(controller.clone());
        }

        for group in groups.values_mut() {
            if group.ingress_controllers.len() > 1 {
                debug!(
                    group = %group.name,
                    "multiple ingress controllers, using synthetic health check"
                );
                group.health.endpoint = SYNTHETIC_HEALTH_ENDPOINT.to_string();
                group.health.expect_code = SYNTHETIC_EXPECT_CODE.to_string();
            }
        }
        groups
    }

    /// Discover the cluster and compute the desired appliance state
    ///
    /// Environment or controller discovery failures are fatal. A controller
    /// whose nodes cannot be listed stays in its group with no nodes.
    #[instrument(skip(self))]
    pub async fn build(&self) -> Result<DesiredState> {
        let environment = self.build_environment().await?;
        let mut controllers = self.find_ingress_controllers().await?;

        let mut nodes = HashMap::new();
        for controller in &mut controllers {
            match self.find_nodes(&controller.node_selector).await {
                Ok(found) => {
                    for node in &found {
                        nodes.insert(node.name.clone(), node.clone());
                    }
                    controller.nodes = found;
                }
                Err(e) => {
                    warn!(
                        controller = %controller.name,
                        error = %e,
                        "failed to find nodes for ingress controller"
                    );
                }
            }
        }

        let service_groups = self.build_service_groups(&controllers, &environment);
        info!(
            nodes = nodes.len(),
            service_groups = service_groups.len(),
            "built desired state"
        );
        Ok(DesiredState {
            nodes,
            service_groups,
        })
    }
}
