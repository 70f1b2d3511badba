//! Service group and membership convergence

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use a10bridge_appliance::ApplianceClient;
use a10bridge_common::model::{Member, ServiceGroup};
use a10bridge_common::{Error, Result};

/// Members `desired` should carry, one per (controller port, node) pair
///
/// Nodes named in `excluded` failed server reconciliation and are never
/// offered as backends. Duplicate (server, port) pairs collapse to one member.
pub fn build_members(desired: &ServiceGroup, excluded: &HashSet<String>) -> Vec<Member> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for controller in &desired.ingress_controllers {
        for node in &controller.nodes {
            if excluded.contains(&node.name) {
                debug!(group = %desired.name, node = %node.name, "excluding failed node");
                continue;
            }
            let member = Member::new(&desired.name, &node.a10_server, controller.port);
            if seen.insert(member.clone()) {
                members.push(member);
            }
        }
    }
    members
}

/// Make sure the service group exists, references its health monitor and
/// carries exactly the desired members
///
/// Fails without any write when no member is left to offer. Member
/// operations are all attempted; the last failure is returned.
#[instrument(skip(client, desired, excluded), fields(group = %desired.name))]
pub async fn process_service_group(
    client: &dyn ApplianceClient,
    desired: &ServiceGroup,
    excluded: &HashSet<String>,
) -> Result<()> {
    let members = build_members(desired, excluded);
    if members.is_empty() {
        return Err(Error::reconcile_for(
            format!("service-group/{}", desired.name),
            "no members found",
        ));
    }
    let desired = ServiceGroup {
        members,
        ..desired.clone()
    };

    let actual = match client.get_service_group(&desired.name).await {
        Ok(actual) => actual,
        Err(e) if client.is_service_group_not_found(&e) => {
            info!(members = desired.members.len(), "creating service group");
            client.create_service_group(&desired).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut last_error = None;
    if actual.health.name != desired.health.name {
        info!(
            health_check = %desired.health.name,
            current = %actual.health.name,
            "updating service group health monitor"
        );
        // membership is converged member by member below
        let update = ServiceGroup {
            members: actual.members.clone(),
            ..desired.clone()
        };
        if let Err(e) = client.update_service_group(&update).await {
            warn!(error = %e, "failed to update service group");
            last_error = Some(Error::from(e));
        }
    }

    if let Some(e) = sync_members(client, &desired.members, &actual.members).await {
        last_error = Some(e);
    }
    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Create missing and delete extra members, returning the last failure
async fn sync_members(
    client: &dyn ApplianceClient,
    desired: &[Member],
    actual: &[Member],
) -> Option<Error> {
    let desired_set: HashSet<&Member> = desired.iter().collect();
    let actual_set: HashSet<&Member> = actual.iter().collect();
    let mut last_error = None;

    for member in desired.iter().filter(|m| !actual_set.contains(m)) {
        info!(server = %member.server_name, port = member.port, "creating member");
        match client.create_member(member).await {
            Ok(()) => {}
            Err(e) if client.is_member_already_exists(&e) => {
                debug!(server = %member.server_name, port = member.port, "member already exists");
            }
            Err(e) => {
                warn!(
                    server = %member.server_name,
                    port = member.port,
                    error = %e,
                    "failed to create member"
                );
                last_error = Some(e.into());
            }
        }
    }

    for member in actual.iter().filter(|m| !desired_set.contains(m)) {
        info!(server = %member.server_name, port = member.port, "deleting member");
        if let Err(e) = client.delete_member(member).await {
            warn!(
                server = %member.server_name,
                port = member.port,
                error = %e,
                "failed to delete member"
            );
            last_error = Some(e.into());
        }
    }

    if last_error.is_none() {
        debug!("members in sync");
    }
    last_error
}
