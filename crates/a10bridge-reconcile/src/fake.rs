//! Test doubles for the appliance contract

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockall::mock;

use a10bridge_appliance::v3::{MEMBER_ALREADY_EXISTS, OBJECT_NOT_FOUND};
use a10bridge_appliance::{ApplianceClient, ApplianceConnector};
use a10bridge_common::config::ApplianceInstance;
use a10bridge_common::model::{HealthCheck, Member, Node, ServiceGroup};
use a10bridge_common::ApplianceError;

mock! {
    pub Client {}

    #[async_trait]
    impl ApplianceClient for Client {
        async fn get_server(&self, server_name: &str) -> Result<Node, ApplianceError>;
        async fn create_server(&self, node: &Node) -> Result<(), ApplianceError>;
        async fn update_server(&self, node: &Node) -> Result<(), ApplianceError>;
        async fn get_health_monitor(&self, name: &str) -> Result<HealthCheck, ApplianceError>;
        async fn create_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError>;
        async fn update_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError>;
        async fn get_service_group(&self, name: &str) -> Result<ServiceGroup, ApplianceError>;
        async fn create_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError>;
        async fn update_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError>;
        async fn create_member(&self, member: &Member) -> Result<(), ApplianceError>;
        async fn delete_member(&self, member: &Member) -> Result<(), ApplianceError>;
        async fn close(&self) -> Result<(), ApplianceError>;
        fn is_server_not_found(&self, err: &ApplianceError) -> bool;
        fn is_health_monitor_not_found(&self, err: &ApplianceError) -> bool;
        fn is_service_group_not_found(&self, err: &ApplianceError) -> bool;
        fn is_member_already_exists(&self, err: &ApplianceError) -> bool;
    }
}

mock! {
    pub Connector {}

    #[async_trait]
    impl ApplianceConnector for Connector {
        async fn connect(
            &self,
            instance: &ApplianceInstance,
        ) -> Result<Box<dyn ApplianceClient>, ApplianceError>;
    }
}

/// Calls that changed appliance state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub server_creates: usize,
    pub server_updates: usize,
    pub monitor_creates: usize,
    pub monitor_updates: usize,
    pub group_creates: usize,
    pub group_updates: usize,
    pub member_creates: usize,
    pub member_deletes: usize,
    pub closes: usize,
}

impl Counts {
    pub fn writes(&self) -> usize {
        self.server_creates
            + self.server_updates
            + self.monitor_creates
            + self.monitor_updates
            + self.group_creates
            + self.group_updates
            + self.member_creates
            + self.member_deletes
    }
}

#[derive(Default)]
struct State {
    servers: HashMap<String, Node>,
    monitors: HashMap<String, HealthCheck>,
    groups: HashMap<String, ServiceGroup>,
    failing_servers: HashSet<String>,
    failing_monitors: HashSet<String>,
    counts: Counts,
}

/// In-memory appliance speaking the v3 error codes
///
/// Clones share state, so a connector can hand out sessions that all see
/// the same appliance.
#[derive(Clone, Default)]
pub struct FakeAppliance {
    state: Arc<Mutex<State>>,
}

impl FakeAppliance {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn counts(&self) -> Counts {
        self.state().counts
    }

    pub fn put_server(&self, node: Node) {
        self.state().servers.insert(node.a10_server.clone(), node);
    }

    pub fn put_health_monitor(&self, health: HealthCheck) {
        self.state().monitors.insert(health.name.clone(), health);
    }

    pub fn put_service_group(&self, group: ServiceGroup) {
        self.state().groups.insert(group.name.clone(), group);
    }

    /// Make every write to `server_name` fail
    pub fn fail_server(&self, server_name: &str) {
        self.state().failing_servers.insert(server_name.to_string());
    }

    /// Make every write to the health monitor `name` fail
    pub fn fail_health_monitor(&self, name: &str) {
        self.state().failing_monitors.insert(name.to_string());
    }

    pub fn has_server(&self, server_name: &str) -> bool {
        self.state().servers.contains_key(server_name)
    }

    pub fn group(&self, name: &str) -> Option<ServiceGroup> {
        self.state().groups.get(name).cloned()
    }

    fn write_server(&self, node: &Node, update: bool) -> Result<(), ApplianceError> {
        let mut state = self.state();
        if state.failing_servers.contains(&node.a10_server) {
            return Err(ApplianceError::new(500, "server rejected"));
        }
        let server = Node {
            name: String::new(),
            labels: Default::default(),
            ..node.clone()
        };
        state.servers.insert(node.a10_server.clone(), server);
        if update {
            state.counts.server_updates += 1;
        } else {
            state.counts.server_creates += 1;
        }
        Ok(())
    }
}

fn not_found(what: &str) -> ApplianceError {
    ApplianceError::new(OBJECT_NOT_FOUND, format!("{what} not found"))
}

#[async_trait]
impl ApplianceClient for FakeAppliance {
    async fn get_server(&self, server_name: &str) -> Result<Node, ApplianceError> {
        self.state()
            .servers
            .get(server_name)
            .cloned()
            .ok_or_else(|| not_found("server"))
    }

    async fn create_server(&self, node: &Node) -> Result<(), ApplianceError> {
        self.write_server(node, false)
    }

    async fn update_server(&self, node: &Node) -> Result<(), ApplianceError> {
        self.write_server(node, true)
    }

    async fn get_health_monitor(&self, name: &str) -> Result<HealthCheck, ApplianceError> {
        self.state()
            .monitors
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("health monitor"))
    }

    async fn create_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError> {
        let mut state = self.state();
        if state.failing_monitors.contains(&health.name) {
            return Err(ApplianceError::new(500, "health monitor rejected"));
        }
        state.monitors.insert(health.name.clone(), health.clone());
        state.counts.monitor_creates += 1;
        Ok(())
    }

    async fn update_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError> {
        let mut state = self.state();
        if state.failing_monitors.contains(&health.name) {
            return Err(ApplianceError::new(500, "health monitor rejected"));
        }
        state.monitors.insert(health.name.clone(), health.clone());
        state.counts.monitor_updates += 1;
        Ok(())
    }

    async fn get_service_group(&self, name: &str) -> Result<ServiceGroup, ApplianceError> {
        self.state()
            .groups
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("service group"))
    }

    async fn create_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError> {
        let mut state = self.state();
        let stored = ServiceGroup {
            ingress_controllers: Vec::new(),
            ..group.clone()
        };
        state.groups.insert(group.name.clone(), stored);
        state.counts.group_creates += 1;
        Ok(())
    }

    async fn update_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError> {
        let mut state = self.state();
        let stored = state
            .groups
            .get_mut(&group.name)
            .ok_or_else(|| not_found("service group"))?;
        stored.health = group.health.clone();
        stored.members = group.members.clone();
        state.counts.group_updates += 1;
        Ok(())
    }

    async fn create_member(&self, member: &Member) -> Result<(), ApplianceError> {
        let mut state = self.state();
        let group = state
            .groups
            .get_mut(&member.service_group)
            .ok_or_else(|| not_found("service group"))?;
        if group.members.contains(member) {
            return Err(ApplianceError::new(MEMBER_ALREADY_EXISTS, "member exists"));
        }
        group.members.push(member.clone());
        state.counts.member_creates += 1;
        Ok(())
    }

    async fn delete_member(&self, member: &Member) -> Result<(), ApplianceError> {
        let mut state = self.state();
        let group = state
            .groups
            .get_mut(&member.service_group)
            .ok_or_else(|| not_found("service group"))?;
        let before = group.members.len();
        group.members.retain(|m| m != member);
        if group.members.len() == before {
            return Err(not_found("member"));
        }
        state.counts.member_deletes += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), ApplianceError> {
        self.state().counts.closes += 1;
        Ok(())
    }

    fn is_server_not_found(&self, err: &ApplianceError) -> bool {
        err.code == OBJECT_NOT_FOUND
    }

    fn is_health_monitor_not_found(&self, err: &ApplianceError) -> bool {
        err.code == OBJECT_NOT_FOUND
    }

    fn is_service_group_not_found(&self, err: &ApplianceError) -> bool {
        err.code == OBJECT_NOT_FOUND
    }

    fn is_member_already_exists(&self, err: &ApplianceError) -> bool {
        err.code == MEMBER_ALREADY_EXISTS
    }
}
