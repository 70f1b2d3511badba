//! Run orchestration across appliance instances

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use a10bridge_appliance::{ApplianceClient, ApplianceConnector};
use a10bridge_cluster::{DesiredState, DesiredStateBuilder};
use a10bridge_common::config::ApplianceInstance;
use a10bridge_common::model::{Node, ServiceGroup};
use a10bridge_common::{Error, Result};

use crate::health_check::process_health_check;
use crate::node::process_node;
use crate::report::{InstanceReport, RunOutcome, RunReport};
use crate::service_group::process_service_group;

/// Knobs for one orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Wall clock limit of one run
    pub timeout: Duration,
    /// Process instances, nodes and groups in name order
    pub sort: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            sort: false,
        }
    }
}

/// Sequences desired state construction and per-instance reconciliation
pub struct Orchestrator {
    builder: DesiredStateBuilder,
    connector: Arc<dyn ApplianceConnector>,
    instances: Vec<ApplianceInstance>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborators
    pub fn new(
        builder: DesiredStateBuilder,
        connector: Arc<dyn ApplianceConnector>,
        instances: Vec<ApplianceInstance>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            builder,
            connector,
            instances,
            settings,
        }
    }

    /// Build desired state and converge every instance once
    ///
    /// Only a desired state failure is returned as an error. Instance and
    /// entity failures are recorded in the report.
    pub async fn reconcile_once(&self) -> Result<RunReport> {
        let state = self.builder.build().await?;

        let mut instances: Vec<&ApplianceInstance> = self.instances.iter().collect();
        if self.settings.sort {
            instances.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let mut report = RunReport::default();
        for instance in instances {
            report
                .instances
                .push(self.reconcile_instance(instance, &state).await);
        }
        Ok(report)
    }

    #[instrument(skip(self, instance, state), fields(instance = %instance.name))]
    async fn reconcile_instance(
        &self,
        instance: &ApplianceInstance,
        state: &DesiredState,
    ) -> InstanceReport {
        let mut report = InstanceReport::new(&instance.name);

        let client = match self.connector.connect(instance).await {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "failed to connect to appliance");
                report.connection_error = Some(e);
                return report;
            }
        };

        report.failed_nodes = self.process_nodes(client.as_ref(), state).await;
        report.failed_groups = self
            .process_groups(client.as_ref(), state, &report.failed_nodes)
            .await;

        if let Err(e) = client.close().await {
            warn!(error = %e, "failed to close appliance session");
            report.close_error = Some(e);
        }

        info!(
            failed_nodes = report.failed_nodes.len(),
            failed_groups = report.failed_groups.len(),
            "appliance reconciled"
        );
        report
    }

    async fn process_nodes(
        &self,
        client: &dyn ApplianceClient,
        state: &DesiredState,
    ) -> Vec<String> {
        let mut nodes: Vec<&Node> = state.nodes.values().collect();
        if self.settings.sort {
            nodes.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let mut failed = Vec::new();
        for node in nodes {
            if let Err(e) = process_node(client, node).await {
                error!(node = %node.name, error = %e, "failed to process node");
                failed.push(node.name.clone());
            }
        }
        failed
    }

    async fn process_groups(
        &self,
        client: &dyn ApplianceClient,
        state: &DesiredState,
        failed_nodes: &[String],
    ) -> Vec<String> {
        let mut groups: Vec<&ServiceGroup> = state.service_groups.values().collect();
        if self.settings.sort {
            groups.sort_by(|a, b| a.name.cmp(&b.name));
        }
        let excluded: HashSet<String> = failed_nodes.iter().cloned().collect();

        let mut failed = Vec::new();
        for group in groups {
            if let Err(e) = process_health_check(client, &group.health).await {
                error!(group = %group.name, error = %e, "failed to process health check");
                failed.push(group.name.clone());
                continue;
            }
            if let Err(e) = process_service_group(client, group, &excluded).await {
                error!(group = %group.name, error = %e, "failed to process service group");
                failed.push(group.name.clone());
            }
        }
        failed
    }

    /// Run once, bounded by the configured timeout
    ///
    /// A run that overruns is detached, not aborted: calls already issued to
    /// an appliance are left to finish on their own.
    pub async fn run(self: &Arc<Self>) -> RunOutcome {
        let orchestrator = Arc::clone(self);
        let task = tokio::spawn(async move { orchestrator.reconcile_once().await });

        let outcome = match tokio::time::timeout(self.settings.timeout, task).await {
            Ok(Ok(Ok(report))) => RunOutcome::from_report(report),
            Ok(Ok(Err(e))) => {
                error!(error = %e, "failed to build desired state");
                RunOutcome::Failed(e)
            }
            Ok(Err(e)) => RunOutcome::Failed(Error::internal_with_context(
                "orchestrator",
                format!("reconciliation task failed: {e}"),
            )),
            Err(_) => {
                error!(timeout = ?self.settings.timeout, "reconciliation timed out");
                RunOutcome::TimedOut
            }
        };
        info!(outcome = outcome.label(), "run finished");
        outcome
    }

    /// Repeat bounded runs every `interval` until Ctrl-C or a run that did not complete
    pub async fn run_daemon(self: &Arc<Self>, interval: Duration) -> RunOutcome {
        self.run_daemon_until(interval, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Repeat bounded runs every `interval` until `shutdown` resolves
    ///
    /// Returns the last outcome. Failed and timed out runs stop the loop;
    /// degraded runs are retried on the next tick.
    pub async fn run_daemon_until(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: impl Future<Output = ()>,
    ) -> RunOutcome {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut last = RunOutcome::Normal(RunReport::default());
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping daemon");
                    return last;
                }
                _ = ticker.tick() => {}
            }

            last = self.run().await;
            if !last.should_continue() {
                warn!(outcome = last.label(), "stopping daemon");
                return last;
            }
        }
    }
}
