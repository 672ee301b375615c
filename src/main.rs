use anyhow::{Context, Result};
use fleetcast::api::{create_app, WsAppState};
use fleetcast::config::load_or_default;
use fleetcast::fleet::FleetStore;
use fleetcast::simulation::SimulationHandle;
use fleetcast::subscription::ConnectionRegistry;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetcast=info".into()),
        )
        .init();

    info!("Fleetcast starting...");

    let config_path =
        std::env::var("FLEETCAST_CONFIG").unwrap_or_else(|_| "fleetcast.toml".to_string());
    let mut config = load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;

    info!(
        config = %config_path,
        addr = %config.bind_addr(),
        vehicles = config.simulation.vehicle_count,
        tick_ms = config.simulation.tick_interval_ms,
        boundary = ?config.simulation.boundary,
        "Configuration loaded"
    );

    let fleet = Arc::new(FleetStore::new(
        config.simulation.fleet_settings(),
        config.simulation.default_location(),
    ));
    let registry = Arc::new(ConnectionRegistry::new(config.broadcast.send_timeout()));

    let simulation = SimulationHandle::spawn(
        Arc::clone(&fleet),
        Arc::clone(&registry),
        config.simulation.tick_interval(),
    );

    let state = Arc::new(WsAppState {
        fleet: Arc::clone(&fleet),
        registry: Arc::clone(&registry),
        channel_capacity: config.broadcast.channel_capacity,
    });
    let router = create_app(state, &config.server.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "Fleetcast listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    simulation.shutdown().await;
    info!("Fleetcast stopped");

    Ok(())
}
