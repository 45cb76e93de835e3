use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reachmap::{NominatimClient, OpenRouteServiceClient, Orchestrator, ReachMapConfig, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ReachMapConfig::load_from_path(config_path)?;
    telemetry::init(&config.logging)?;

    let api_key = config.require_api_key()?;
    let geocoder = NominatimClient::new(&config.geocoder).context("Failed to set up geocoder")?;
    let isochrones = OpenRouteServiceClient::new(&config.isochrone, api_key)
        .context("Failed to set up isochrone client")?;

    let orchestrator = Arc::new(Orchestrator::from_config(
        &config,
        Arc::new(geocoder),
        Arc::new(isochrones),
    ));

    web::run(&config.server, orchestrator).await
}
