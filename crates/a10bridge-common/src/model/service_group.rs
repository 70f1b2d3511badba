use std::hash::{Hash, Hasher};

use super::{HealthCheck, IngressController};

/// A named pool of backend members sharing one health check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceGroup {
    /// Group name
    pub name: String,
    /// Health check applied to every member
    pub health: HealthCheck,
    /// Ingress controllers feeding this group (desired state only)
    pub ingress_controllers: Vec<IngressController>,
    /// Members of the group
    pub members: Vec<Member>,
}

/// One backend (server, port) entry of a service group
///
/// Equality and hashing only consider the server name and port. Members are
/// always compared within the member list of a single group.
#[derive(Debug, Clone, Default)]
pub struct Member {
    /// Owning service group
    pub service_group: String,
    /// Appliance server name
    pub server_name: String,
    /// Port traffic is sent to
    pub port: u16,
}

impl Member {
    /// Create a member of `service_group`
    pub fn new(
        service_group: impl Into<String>,
        server_name: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            service_group: service_group.into(),
            server_name: server_name.into(),
            port,
        }
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.server_name == other.server_name && self.port == other.port
    }
}

impl Eq for Member {}

impl Hash for Member {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server_name.hash(state);
        self.port.hash(state);
    }
}
