//! Reconciliation model shared by discovery, the appliance clients and the reconcilers
//!
//! Every value here is rebuilt from the cluster on each run and owned by that run.

mod environment;
mod health_check;
mod ingress;
mod node;
mod service_group;

pub use environment::Environment;
pub use health_check::HealthCheck;
pub use ingress::IngressController;
pub use node::Node;
pub use service_group::{Member, ServiceGroup};
