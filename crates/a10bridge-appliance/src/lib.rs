//! Appliance abstraction for a10bridge
//!
//! [`ApplianceClient`] is the single contract the reconcilers talk to. One
//! implementation exists per wire protocol version ([`v2`], [`v3`]);
//! [`HttpApplianceConnector`] authenticates and picks the implementation
//! from the instance configuration.

#![deny(missing_docs)]

mod client;
mod http;
pub mod v2;
pub mod v3;

use std::time::Duration;

use a10bridge_common::model::Node;
use a10bridge_common::ApplianceError;

pub use client::{ApplianceClient, ApplianceConnector, HttpApplianceConnector};

/// Timeout applied to every appliance HTTP request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Server weight as the integer both protocol versions expect on the wire
fn wire_weight(node: &Node) -> Result<i64, ApplianceError> {
    node.weight.trim().parse().map_err(|_| {
        ApplianceError::local(format!(
            "weight '{}' of server {} is not an integer",
            node.weight, node.a10_server
        ))
    })
}
