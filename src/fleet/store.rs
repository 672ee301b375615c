use super::{generate_fleet, DEFAULT_FLEET_SIZE, DEFAULT_SPAWN_RADIUS_KM};
use crate::location::Location;
use crate::vehicle::{BoundaryPolicy, Vehicle, VehicleSnapshot};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Fleet parameters fixed for the lifetime of the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetSettings {
    pub vehicle_count: usize,
    pub spawn_radius_km: f64,
    pub boundary: BoundaryPolicy,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            vehicle_count: DEFAULT_FLEET_SIZE,
            spawn_radius_km: DEFAULT_SPAWN_RADIUS_KM,
            boundary: BoundaryPolicy::default(),
        }
    }
}

/// Fleet snapshot together with the reference location it was taken against
#[derive(Debug, Clone)]
pub struct FleetView {
    pub reference: Location,
    pub vehicles: Vec<VehicleSnapshot>,
}

/// Result of advancing the whole fleet once
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// Post-tick state of every vehicle, including ones that failed to move
    pub vehicles: Vec<VehicleSnapshot>,
    /// Vehicles whose advance was rejected this tick
    pub failed: usize,
}

struct FleetState {
    reference: Location,
    vehicles: Vec<Vehicle>,
}

/// Process-wide fleet and reference location.
///
/// A single mutex guards both; every operation takes it once, so readers
/// never observe a half-advanced or half-replaced fleet.
pub struct FleetStore {
    state: Mutex<FleetState>,
    settings: FleetSettings,
}

impl FleetStore {
    /// Create a store with a freshly generated fleet around `reference`
    pub fn new(settings: FleetSettings, reference: Location) -> Self {
        let vehicles = generate_fleet(
            reference,
            settings.vehicle_count,
            settings.spawn_radius_km,
            &mut rand::thread_rng(),
        );

        Self {
            state: Mutex::new(FleetState {
                reference,
                vehicles,
            }),
            settings,
        }
    }

    /// Create a store with an explicit fleet (tests, fixtures)
    pub fn with_vehicles(settings: FleetSettings, reference: Location, vehicles: Vec<Vehicle>) -> Self {
        Self {
            state: Mutex::new(FleetState {
                reference,
                vehicles,
            }),
            settings,
        }
    }

    pub fn reference(&self) -> Location {
        self.state.lock().reference
    }

    pub fn len(&self) -> usize {
        self.state.lock().vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot every vehicle without mutating anything
    pub fn current_snapshot(&self) -> Vec<VehicleSnapshot> {
        self.state.lock().vehicles.iter().map(Vehicle::snapshot).collect()
    }

    /// Snapshot plus reference location, read under one lock
    pub fn current_view(&self) -> FleetView {
        let state = self.state.lock();
        FleetView {
            reference: state.reference,
            vehicles: state.vehicles.iter().map(Vehicle::snapshot).collect(),
        }
    }

    /// Move the reference location and replace the fleet around it.
    ///
    /// Returns the view of the new fleet taken under the same lock.
    pub fn regenerate(&self, lat: f64, lng: f64) -> FleetView {
        let reference = Location::new(lat, lng);
        let vehicles = generate_fleet(
            reference,
            self.settings.vehicle_count,
            self.settings.spawn_radius_km,
            &mut rand::thread_rng(),
        );
        let snapshots = vehicles.iter().map(Vehicle::snapshot).collect();

        {
            let mut state = self.state.lock();
            state.reference = reference;
            state.vehicles = vehicles;
        }

        info!(
            lat = lat,
            lng = lng,
            vehicles = self.settings.vehicle_count,
            "Fleet regenerated around new reference location"
        );

        FleetView {
            reference,
            vehicles: snapshots,
        }
    }

    /// Advance every vehicle one tick and snapshot the result.
    ///
    /// A vehicle that fails to advance keeps its previous state and is still
    /// included in the snapshot; the rest of the fleet is unaffected.
    pub fn advance_all(&self) -> TickOutcome {
        let mut rng = rand::thread_rng();
        let mut state = self.state.lock();
        let reference = state.reference;
        let mut failed = 0;

        for vehicle in state.vehicles.iter_mut() {
            if let Err(e) = vehicle.advance(reference, self.settings.boundary, &mut rng) {
                warn!(vehicle = %vehicle.id, error = %e, "Vehicle advance rejected");
                failed += 1;
            }
        }

        TickOutcome {
            vehicles: state.vehicles.iter().map(Vehicle::snapshot).collect(),
            failed,
        }
    }
}
