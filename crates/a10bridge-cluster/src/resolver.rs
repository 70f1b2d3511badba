//! Hostname resolution for cluster nodes

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use a10bridge_common::{Error, Result};

/// Resolves a node name to the address the appliance should use
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to a single IP address in textual form
    async fn resolve(&self, host: &str) -> Result<String>;
}

/// Resolver backed by the system's name service
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> Result<String> {
        let mut addrs = tokio::net::lookup_host((host, 0)).await.map_err(|e| {
            Error::discovery_with_context("dns", format!("failed to resolve {host}: {e}"))
        })?;
        addrs
            .next()
            .map(|addr| addr.ip().to_string())
            .ok_or_else(|| {
                Error::discovery_with_context("dns", format!("no address found for {host}"))
            })
    }
}
