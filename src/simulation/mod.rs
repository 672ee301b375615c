// Fixed-interval simulation loop

use crate::fleet::FleetStore;
use crate::subscription::{BroadcastReport, ConnectionRegistry, ServerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};


pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Advance the fleet once and broadcast the result as `vehicle_update`.
///
/// Advancing and snapshotting happen under one fleet lock, so every
/// subscriber receives the same post-tick state.
pub async fn run_tick(fleet: &FleetStore, registry: &ConnectionRegistry) -> BroadcastReport {
    let outcome = fleet.advance_all();
    if outcome.failed > 0 {
        warn!(failed = outcome.failed, "Some vehicles were not advanced this tick");
    }

    match ServerMessage::vehicle_update(outcome.vehicles).to_json() {
        Ok(json) => registry.broadcast(&json).await,
        Err(e) => {
            error!(error = %e, "Failed to encode vehicle update");
            BroadcastReport::default()
        }
    }
}

/// Tick until `shutdown` flips to true or its sender is dropped
pub async fn run_simulation(
    fleet: Arc<FleetStore>,
    registry: Arc<ConnectionRegistry>,
    tick_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(tick_interval);

    // Skip missed ticks to prevent backlog under load
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_ms = tick_interval.as_millis() as u64, "Simulation loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = run_tick(&fleet, &registry).await;
                if report.pruned > 0 {
                    debug!(pruned = report.pruned, "Pruned subscribers during tick");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Simulation loop stopped");
}

/// Handle to the running simulation task
pub struct SimulationHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SimulationHandle {
    /// Spawn the simulation loop on the current runtime
    pub fn spawn(
        fleet: Arc<FleetStore>,
        registry: Arc<ConnectionRegistry>,
        tick_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_simulation(fleet, registry, tick_interval, shutdown_rx));
        Self { shutdown_tx, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop to stop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Simulation task did not exit cleanly");
        }
    }
}
