//! a10bridge - keeps A10 appliances in sync with a cluster's ingress layer

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tracing::{error, info};

use a10bridge_appliance::HttpApplianceConnector;
use a10bridge_cluster::{DesiredStateBuilder, KubeClusterClient};
use a10bridge_common::config::BridgeConfig;
use a10bridge_common::telemetry::{init_telemetry, LogFormat, TelemetryConfig};
use a10bridge_reconcile::{Orchestrator, OrchestratorSettings, RunOutcome};

const FAILED_EXIT_CODE: u8 = 1;

/// a10bridge - synchronize A10 servers, health monitors and service groups
/// with the ingress controllers of a Kubernetes cluster
#[derive(Parser, Debug)]
#[command(name = "a10bridge", version, about, long_about = None)]
struct Cli {
    /// Path to the YAML file listing the appliances to manage
    #[arg(long = "a10-config", env = "A10CONFIG", value_parser = existing_file)]
    a10_config: PathBuf,

    /// Password for appliances that do not set one in the config file
    #[arg(long = "a10-pwd", env = "A10PWD", hide_env_values = true)]
    a10_pwd: Option<String>,

    /// Enable debug logging
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    debug: bool,

    /// Seconds a run may take, and between runs in daemon mode
    #[arg(
        long,
        env = "INTERVAL",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    /// Keep running, reconciling every interval
    #[arg(
        long,
        env = "DAEMON",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    daemon: bool,

    /// Process appliances, nodes and service groups in name order
    #[arg(
        long,
        env = "SORT",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    sort: bool,

    /// Log output format (text or json)
    #[arg(long = "log-format", env = "LOGFORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            debug: self.debug,
            format: self.log_format,
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    fn settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            timeout: self.interval(),
            sort: self.sort,
        }
    }
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("config file '{value}' does not exist"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_telemetry(&cli.telemetry()) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::from(FAILED_EXIT_CODE);
    }

    match run(cli).await {
        Ok(outcome) => {
            info!(outcome = outcome.label(), "a10bridge finished");
            ExitCode::from(u8::try_from(outcome.exit_code()).unwrap_or(FAILED_EXIT_CODE))
        }
        Err(e) => {
            error!(error = ?e, "a10bridge failed to start");
            ExitCode::from(FAILED_EXIT_CODE)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let config = BridgeConfig::load(&cli.a10_config, cli.a10_pwd.as_deref())
        .context("failed to load appliance configuration")?;
    info!(
        instances = config.instances.len(),
        daemon = cli.daemon,
        interval = cli.interval,
        "starting a10bridge"
    );

    let cluster = KubeClusterClient::try_default()
        .await
        .context("failed to create Kubernetes client")?;

    let orchestrator = Arc::new(Orchestrator::new(
        DesiredStateBuilder::new(Arc::new(cluster)),
        Arc::new(HttpApplianceConnector::default()),
        config.instances,
        cli.settings(),
    ));

    let outcome = if cli.daemon {
        orchestrator.run_daemon(cli.interval()).await
    } else {
        orchestrator.run().await
    };
    Ok(outcome)
}
