// Fleet generation and the shared fleet store

mod store;

pub use store::{FleetSettings, FleetStore, FleetView, TickOutcome};

use crate::location::{Location, KM_PER_DEGREE};
use crate::vehicle::Vehicle;
use rand::Rng;
use std::f64::consts::TAU;


pub const DEFAULT_FLEET_SIZE: usize = 10;
pub const DEFAULT_SPAWN_RADIUS_KM: f64 = 5.0;

/// Scatter `count` vehicles around `center`.
///
/// Each vehicle gets a uniform angle and a uniform distance in
/// `[0, radius_km / 111]` degrees. Sampling the distance (not the area)
/// uniformly puts more vehicles near the centre.
///
/// Ids always start at `UBER-001`.
pub fn generate_fleet<R: Rng + ?Sized>(
    center: Location,
    count: usize,
    radius_km: f64,
    rng: &mut R,
) -> Vec<Vehicle> {
    let radius_deg = radius_km.max(0.0) / KM_PER_DEGREE;

    (1..=count)
        .map(|n| {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(0.0..=radius_deg);
            let lat = center.lat + distance * angle.cos();
            let lng = center.lng + distance * angle.sin();
            Vehicle::new(Vehicle::label(n), lat, lng, rng)
        })
        .collect()
}
