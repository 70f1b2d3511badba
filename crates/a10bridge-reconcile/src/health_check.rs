//! Health monitor convergence for one service group

use tracing::{debug, info, instrument};

use a10bridge_appliance::ApplianceClient;
use a10bridge_common::model::HealthCheck;
use a10bridge_common::Result;

/// Make sure the appliance health monitor matches `desired`
///
/// Any difference in the compared fields rewrites the whole monitor.
#[instrument(skip(client, desired), fields(health_check = %desired.name))]
pub async fn process_health_check(
    client: &dyn ApplianceClient,
    desired: &HealthCheck,
) -> Result<()> {
    match client.get_health_monitor(&desired.name).await {
        Ok(actual) if desired.same_config(&actual) => {
            debug!("health monitor in sync");
            Ok(())
        }
        Ok(_) => {
            info!(endpoint = %desired.endpoint, port = desired.port, "updating health monitor");
            client.update_health_monitor(desired).await?;
            Ok(())
        }
        Err(e) if client.is_health_monitor_not_found(&e) => {
            info!(endpoint = %desired.endpoint, port = desired.port, "creating health monitor");
            client.create_health_monitor(desired).await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
