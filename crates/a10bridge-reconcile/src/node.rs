//! Server convergence for one node

use tracing::{debug, info, instrument};

use a10bridge_appliance::ApplianceClient;
use a10bridge_common::model::Node;
use a10bridge_common::Result;

/// Make sure the appliance server for `node` exists with its address and weight
///
/// Weights are compared as strings, so `"01"` and `"1"` differ.
#[instrument(skip(client, node), fields(node = %node.name, server = %node.a10_server))]
pub async fn process_node(client: &dyn ApplianceClient, node: &Node) -> Result<()> {
    match client.get_server(&node.a10_server).await {
        Ok(actual) if node.same_server_config(&actual) => {
            debug!("server in sync");
            Ok(())
        }
        Ok(actual) => {
            info!(
                ip = %node.ip,
                weight = %node.weight,
                current_ip = %actual.ip,
                current_weight = %actual.weight,
                "updating server"
            );
            client.update_server(node).await?;
            Ok(())
        }
        Err(e) if client.is_server_not_found(&e) => {
            info!(ip = %node.ip, weight = %node.weight, "creating server");
            client.create_server(node).await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
