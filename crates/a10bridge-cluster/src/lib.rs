//! Cluster discovery for a10bridge
//!
//! [`ClusterClient`] reads nodes, the cluster config map and ingress
//! controllers from Kubernetes. [`DesiredStateBuilder`] turns what it finds
//! into the servers and service groups an appliance should carry.

#![deny(missing_docs)]

mod builder;
mod client;
mod convert;
mod resolver;

pub use builder::{DesiredState, DesiredStateBuilder};
pub use client::{ClusterClient, KubeClusterClient};
pub use resolver::{DnsResolver, HostResolver};
