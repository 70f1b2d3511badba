//! Reconciliation of appliances against the cluster
//!
//! Each reconciler converges one kind of appliance object and isolates its
//! failures to the entity being processed. The [`Orchestrator`] sequences
//! them per appliance instance, bounds every run by a timeout and drives the
//! daemon loop.

#![deny(missing_docs)]

mod health_check;
mod node;
mod orchestrator;
mod report;
mod service_group;

#[cfg(test)]
mod fake;

pub use health_check::process_health_check;
pub use node::process_node;
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use report::{InstanceReport, RunOutcome, RunReport};
pub use service_group::{build_members, process_service_group};
