//! offsetd - align FRITZ!Box thermostat offsets with the room temperature

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fritz_client::FritzClient;
use offset_cloud::{NetatmoClient, ThingSpeakClient};
use offsetd::{Cli, Config, FileConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "offsetd=info,fritz_client=info,offset_cloud=info";

/// Connect timeout for the gateway on the local network
const GATEWAY_CONNECT_TIMEOUT_SECS: u64 = 10;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

async fn execute(cli: &Cli) -> Result<()> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let config = Config::resolve(cli, file)?;
    tracing::debug!(?config, "Resolved configuration");

    let mut gateway = FritzClient::with_config(
        &config.fritz_url,
        &config.fritz_username,
        &config.fritz_password,
        config.timeout,
        std::time::Duration::from_secs(GATEWAY_CONNECT_TIMEOUT_SECS).min(config.timeout),
    )
    .context("Failed to create gateway client")?;
    let mut weather = NetatmoClient::with_config(
        offset_cloud::netatmo::NETATMO_API,
        config.netatmo.clone(),
        config.timeout,
    )
    .context("Failed to create Netatmo client")?;
    let telemetry = ThingSpeakClient::with_config(
        offset_cloud::thingspeak::THINGSPEAK_API,
        &config.thingspeak_api_key,
        config.timeout,
    )
    .context("Failed to create ThingSpeak client")?;

    let report = offsetd::run(&config.devices, &mut gateway, &mut weather, &telemetry).await?;

    tracing::info!(
        devices = config.devices.len(),
        changed = report.changed.len(),
        temperature = report.temperature,
        "Run complete"
    );
    Ok(())
}
