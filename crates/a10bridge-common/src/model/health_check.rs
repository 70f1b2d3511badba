/// HTTP health monitor definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheck {
    /// Monitor name; equals the owning service group name once assigned
    pub name: String,
    /// HTTP path probed
    pub endpoint: String,
    /// Expected HTTP status code
    pub expect_code: String,
    /// Port probed
    pub port: u16,
    /// Seconds between probes
    pub interval: u32,
    /// Seconds before a probe times out
    pub timeout: u32,
    /// Failed probes before the server is marked down
    pub retry_count: u32,
    /// Consecutive successful probes before the server is marked up
    pub required_passes: u32,
}

impl HealthCheck {
    /// Whether the probing configuration of both monitors is identical
    ///
    /// The name is not compared: monitors are always fetched by name.
    pub fn same_config(&self, actual: &HealthCheck) -> bool {
        self.endpoint == actual.endpoint
            && self.expect_code == actual.expect_code
            && self.interval == actual.interval
            && self.port == actual.port
            && self.required_passes == actual.required_passes
            && self.retry_count == actual.retry_count
            && self.timeout == actual.timeout
    }
}
