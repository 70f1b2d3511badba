//! Logging initialization
//!
//! Sets up a `tracing` subscriber with an `EnvFilter` and either human
//! readable or JSON line output. `RUST_LOG` takes precedence over the
//! configured defaults.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,kube=warn,hyper=warn,reqwest=warn";

/// Filter used in debug mode when `RUST_LOG` is unset
const DEBUG_FILTER: &str = "info,a10bridge=debug,a10bridge_common=debug,a10bridge_appliance=debug,\
a10bridge_cluster=debug,a10bridge_reconcile=debug,kube=info,hyper=warn";

/// Errors that can occur during telemetry initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Configuration for telemetry initialization
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Enable debug logging for the a10bridge crates
    pub debug: bool,
    /// Output format
    pub format: LogFormat,
}

impl TelemetryConfig {
    fn default_filter(&self) -> &'static str {
        if self.debug {
            DEBUG_FILTER
        } else {
            DEFAULT_FILTER
        }
    }
}

/// Initialize the global tracing subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    // Option<Layer> implements Layer, so only the selected format is active
    let json_layer = (config.format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
    });
    let text_layer = (config.format == LogFormat::Text)
        .then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn debug_mode_raises_crate_verbosity() {
        let config = TelemetryConfig {
            debug: true,
            ..Default::default()
        };
        assert!(config.default_filter().contains("a10bridge_reconcile=debug"));
        assert!(!TelemetryConfig::default()
            .default_filter()
            .contains("a10bridge_reconcile=debug"));
    }
}
